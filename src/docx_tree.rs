use crate::node::Node;
use docx_rust::document::{BodyContent, ParagraphContent, RunContent, TableCellContent, TableRowContent};
use docx_rust::Docx;

/// Convert a parsed DOCX document body to a generic node tree rooted at
/// `body`, shaped like the HTML a converter would produce: `h1`..`h6`,
/// `p`, `li`, `table/tr/td` and `img` for drawings.
pub fn docx_to_tree(docx: &Docx) -> Node {
    let mut ctx = ConvertContext { output: Vec::new() };

    for content in &docx.document.body.content {
        ctx.convert_body_content(content);
    }

    Node::container("body", ctx.output)
}

struct ConvertContext {
    output: Vec<Node>,
}

/// Inline text of a paragraph plus whether it holds a drawing.
#[derive(Default)]
struct InlineContent {
    text: String,
    has_drawing: bool,
}

impl ConvertContext {
    fn convert_body_content(&mut self, content: &BodyContent) {
        match content {
            BodyContent::Paragraph(para) => {
                if let Some(node) = convert_paragraph(para) {
                    self.output.push(node);
                }
            }
            BodyContent::Table(table) => {
                if let Some(node) = convert_table(table) {
                    self.output.push(node);
                }
            }
            BodyContent::Sdt(sdt) => {
                // SDT has content: Option<SDTContent> which has content: Vec<BodyContent>
                if let Some(ref sdt_content) = sdt.content {
                    for item in &sdt_content.content {
                        self.convert_body_content(item);
                    }
                }
            }
            _ => {}
        }
    }
}

fn convert_paragraph(para: &docx_rust::document::Paragraph) -> Option<Node> {
    let mut heading_level: Option<u8> = None;
    let mut numbered = false;

    if let Some(ref prop) = para.property {
        if let Some(ref style_id) = prop.style_id {
            heading_level = heading_level_for_style(style_id.value.as_ref());
        }
        if let Some(ref num_prop) = prop.numbering {
            numbered = num_prop.id.is_some();
        }
    }

    let inline = collect_inline_content(para);
    let text = inline.text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.is_empty() {
        return inline.has_drawing.then(|| Node::new("img", ""));
    }

    let tag = match (heading_level, numbered) {
        (Some(level), _) => format!("h{}", level),
        (None, true) => "li".to_string(),
        (None, false) => "p".to_string(),
    };

    let mut node = Node::new(tag, text);
    if inline.has_drawing {
        node.children.push(Node::new("img", ""));
    }
    Some(node)
}

fn heading_level_for_style(style_id: &str) -> Option<u8> {
    match style_id {
        "Heading1" | "heading1" | "heading 1" => Some(1),
        "Heading2" | "heading2" | "heading 2" => Some(2),
        "Heading3" | "heading3" | "heading 3" => Some(3),
        "Heading4" | "heading4" | "heading 4" => Some(4),
        "Heading5" | "heading5" | "heading 5" => Some(5),
        "Heading6" | "heading6" | "heading 6" => Some(6),
        "Title" | "title" => Some(1),
        "Subtitle" | "subtitle" => Some(2),
        _ => None,
    }
}

fn collect_inline_content(para: &docx_rust::document::Paragraph) -> InlineContent {
    let mut inline = InlineContent::default();

    for pc in &para.content {
        match pc {
            ParagraphContent::Run(run) => collect_run_text(run, &mut inline),
            ParagraphContent::Link(link) => {
                if let Some(ref run) = link.content {
                    collect_run_text(run, &mut inline);
                }
            }
            _ => {}
        }
    }

    inline
}

fn collect_run_text(run: &docx_rust::document::Run, inline: &mut InlineContent) {
    for rc in &run.content {
        match rc {
            RunContent::Text(t) => inline.text.push_str(&t.text),
            RunContent::Break(_) => inline.text.push('\n'),
            RunContent::Tab(_) => inline.text.push('\t'),
            RunContent::Drawing(_) => inline.has_drawing = true,
            _ => {}
        }
    }
}

fn convert_table(table: &docx_rust::document::Table) -> Option<Node> {
    let mut rows = Vec::new();

    for row in &table.rows {
        let mut cells = Vec::new();

        for cell_content in &row.cells {
            if let TableRowContent::TableCell(cell) = cell_content {
                let paragraphs = cell
                    .content
                    .iter()
                    .filter_map(|tc| {
                        let TableCellContent::Paragraph(para) = tc;
                        convert_paragraph(para)
                    })
                    .collect();
                cells.push(Node::container("td", paragraphs));
            }
        }

        if !cells.is_empty() {
            rows.push(Node::container("tr", cells));
        }
    }

    (!rows.is_empty()).then(|| Node::container("table", rows))
}
