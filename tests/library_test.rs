use doomreader::chunk::ChunkKind;
use doomreader::node::Node;
use doomreader::reader::MemoryBook;
use doomreader::{ChunkingConfig, Direction, Error, Library};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

fn novel(title: &str) -> MemoryBook {
    let narrative = "The rain had not stopped for three days, and the river below the mill had \
                     swollen past the stones where the children used to sit in the long summers.";
    MemoryBook::new(title, "A. Writer")
        .with_resource("OEBPS/Images/cover.jpg", vec![0xFF, 0xD8, 0xFF])
        .with_toc_entry("Text/ch1.xhtml", "Chapter One")
        .with_unit(
            "Text/ch1.xhtml",
            Node::container(
                "body",
                vec![
                    Node::new("h1", "Chapter One"),
                    Node::new("p", "—Hi."),
                    Node::new("p", narrative),
                    Node::new("p", "Short coda."),
                ],
            ),
        )
}

#[test]
fn test_ingest_and_read_back() {
    let library = Library::in_memory();
    let id = library
        .add_reader(&novel("Mill"), &ChunkingConfig::default(), false)
        .unwrap();

    let (book, chunks) = library.load_book(&id).unwrap();
    assert_eq!(book.title, "Mill");
    assert_eq!(book.creator, "A. Writer");
    assert_eq!(book.total_chunks, chunks.len());

    assert_eq!(chunks[0].kind, ChunkKind::Header);
    assert_eq!(chunks[0].content, "Chapter One");
    assert!(chunks[1].content.starts_with("—Hi.\n\nThe rain"));
    assert_eq!(chunks[2].content, "Short coda.");
    assert!(chunks.iter().all(|c| c.chapter == "Chapter One"));
    assert!(chunks.iter().all(|c| !c.content.trim().is_empty()));

    let cover = library.cover(&id).unwrap();
    assert!(cover.starts_with("data:image/jpeg;base64,"));
    assert_eq!(chunks[0].cover_image.as_deref(), Some(cover.as_str()));
    assert_eq!(library.covers().unwrap().len(), 1);
}

#[test]
fn test_remove_deletes_everything() {
    let library = Library::in_memory();
    let id = library
        .add_reader(&novel("Gone"), &ChunkingConfig::default(), true)
        .unwrap();
    assert!(library.image(&id, "OEBPS/Images/cover.jpg").is_some());

    library.remove_book(&id).unwrap();

    assert!(library.shelf().unwrap().is_empty());
    assert!(library.cover(&id).is_none());
    assert!(library.image(&id, "OEBPS/Images/cover.jpg").is_none());
    assert!(matches!(library.load_book(&id), Err(Error::BookNotFound(_))));
    assert!(matches!(library.remove_book(&id), Err(Error::BookNotFound(_))));
}

#[test]
fn test_unsupported_file_leaves_shelf_untouched() {
    let library = Library::in_memory();
    let result = library.add_book(
        &PathBuf::from("notes.txt"),
        &ChunkingConfig::default(),
        true,
    );
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    assert!(library.shelf().unwrap().is_empty());
}

#[test]
fn test_reorder_and_progress() {
    let library = Library::in_memory();
    let config = ChunkingConfig::default();
    let a = library.add_reader(&novel("A"), &config, false).unwrap();
    let b = library.add_reader(&novel("B"), &config, false).unwrap();

    assert!(!library.move_book(&a, Direction::Up).unwrap());
    assert!(library.move_book(&b, Direction::Up).unwrap());
    let order: Vec<String> = library.shelf().unwrap().into_iter().map(|b| b.id).collect();
    assert_eq!(order, vec![b.clone(), a.clone()]);

    assert!(library.update_progress(&a, 2).unwrap());
    assert!(!library.update_progress("missing", 2).unwrap());
    assert_eq!(library.book(&a).unwrap().unwrap().last_read_index, 2);

    assert_eq!(library.toggle_bookmark(&a, "chunk-1").unwrap(), vec!["chunk-1"]);
    assert!(library.toggle_bookmark(&a, "chunk-1").unwrap().is_empty());
    assert!(library.toggle_bookmark("missing", "chunk-1").unwrap().is_empty());
}

#[test]
fn test_concurrent_updates_are_not_lost() {
    let library = Arc::new(Library::in_memory());
    let config = ChunkingConfig::default();
    let id = library.add_reader(&novel("Busy"), &config, false).unwrap();
    let other = library.add_reader(&novel("Other"), &config, false).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let library = Arc::clone(&library);
            let id = id.clone();
            let other = other.clone();
            thread::spawn(move || {
                library.toggle_bookmark(&id, &format!("chunk-{}", i)).unwrap();
                library.update_progress(&id, i).unwrap();
                let direction = if i % 2 == 0 { Direction::Up } else { Direction::Down };
                library.move_book(&other, direction).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let book = library.book(&id).unwrap().unwrap();
    assert_eq!(book.bookmarks.len(), 8);
    assert!(book.last_read_index < 8);

    let mut orders: Vec<i64> = library.shelf().unwrap().iter().map(|b| b.order).collect();
    orders.sort();
    assert_eq!(orders, vec![0, 1]);
}

#[test]
fn test_library_survives_reopen() {
    let dir = tempdir().unwrap();
    let id = {
        let library = Library::open(dir.path()).unwrap();
        let id = library
            .add_reader(&novel("Kept"), &ChunkingConfig::default(), false)
            .unwrap();
        library.toggle_bookmark(&id, "chunk-2").unwrap();
        library.close();
        id
    };

    assert!(dir.path().join("library.db").exists());
    assert!(dir.path().join("shelf.json").exists());

    let library = Library::open(dir.path()).unwrap();
    let (book, chunks) = library.load_book(&id).unwrap();
    assert_eq!(book.bookmarks, vec!["chunk-2"]);
    assert_eq!(chunks.len(), book.total_chunks);
    assert!(library.cover(&id).is_some());
}
