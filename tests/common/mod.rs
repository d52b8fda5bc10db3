//! Shared fixtures for integration tests.
//!
//! `write_minimal_epub` builds a small but complete EPUB 3 container on
//! disk; the artifact helpers mirror the shape of processed output so
//! server tests can run without the processor.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use axum::Router;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use reader3::book::{Book, BookMetadata, ChapterContent, TocEntry};
use reader3::config::Config;
use reader3::routes;
use reader3::state::AppState;

/// A valid 1x1 transparent PNG.
pub const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

const CONTENT_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="pub-id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="pub-id">urn:uuid:7c9f2b46-1111-4a5e-9e0c-aa0123456789</dc:identifier>
    <dc:title>Alice in Wonderland</dc:title>
    <dc:creator>Lewis Carroll</dc:creator>
    <dc:language>en</dc:language>
    <dc:date>1865-11-26</dc:date>
    <meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch3" href="text/ch3.xhtml" media-type="application/xhtml+xml"/>
    <item id="pic" href="images/pic.png" media-type="image/png"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
    <itemref idref="ch3"/>
  </spine>
</package>
"#;

const NAV_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Contents</title></head>
<body>
<nav epub:type="toc">
  <ol>
    <li><a href="text/ch1.xhtml">Down the Rabbit-Hole</a>
      <ol><li><a href="text/ch1.xhtml#fall">A Curious Fall</a></li></ol>
    </li>
    <li><a href="text/ch2.xhtml">The Pool of Tears</a></li>
    <li><a href="text/ch3.xhtml">The Caucus-Race</a></li>
  </ol>
</nav>
</body>
</html>
"#;

const TOC_NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="urn:uuid:7c9f2b46-1111-4a5e-9e0c-aa0123456789"/>
  </head>
  <docTitle><text>Alice in Wonderland</text></docTitle>
  <navMap>
    <navPoint id="np1" playOrder="1">
      <navLabel><text>Down the Rabbit-Hole</text></navLabel>
      <content src="text/ch1.xhtml"/>
    </navPoint>
    <navPoint id="np2" playOrder="2">
      <navLabel><text>The Pool of Tears</text></navLabel>
      <content src="text/ch2.xhtml"/>
    </navPoint>
    <navPoint id="np3" playOrder="3">
      <navLabel><text>The Caucus-Race</text></navLabel>
      <content src="text/ch3.xhtml"/>
    </navPoint>
  </navMap>
</ncx>
"#;

const CH1_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
  <title>Chapter 1</title>
  <link rel="stylesheet" type="text/css" href="../styles.css"/>
</head>
<body>
  <h1 id="fall">Down the Rabbit-Hole</h1>
  <p>Alice was beginning to get very tired of sitting by her sister on the bank.</p>
  <p><img src="../images/pic.png" alt="the rabbit"/></p>
  <script>alert("tracking");</script>
</body>
</html>
"#;

const CH2_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Chapter 2</title></head>
<body>
  <style>p { font-size: 2em; }</style>
  <h1>The Pool of Tears</h1>
  <p>Curiouser and curiouser, cried Alice.</p>
</body>
</html>
"#;

const CH3_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Chapter 3</title></head>
<body>
  <h1>The Caucus-Race</h1>
  <p onclick="doThing()" onmouseenter="track()">They were indeed a queer-looking party.</p>
</body>
</html>
"#;

/// Write a three-chapter EPUB with a nested TOC and one image.
pub fn write_minimal_epub(path: &Path) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);

    // The mimetype entry must come first and uncompressed
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("mimetype", stored).unwrap();
    writer.write_all(b"application/epub+zip").unwrap();

    let deflated = SimpleFileOptions::default();
    let entries: [(&str, &[u8]); 8] = [
        ("META-INF/container.xml", CONTAINER_XML.as_bytes()),
        ("OEBPS/content.opf", CONTENT_OPF.as_bytes()),
        ("OEBPS/nav.xhtml", NAV_XHTML.as_bytes()),
        ("OEBPS/toc.ncx", TOC_NCX.as_bytes()),
        ("OEBPS/text/ch1.xhtml", CH1_XHTML.as_bytes()),
        ("OEBPS/text/ch2.xhtml", CH2_XHTML.as_bytes()),
        ("OEBPS/text/ch3.xhtml", CH3_XHTML.as_bytes()),
        ("OEBPS/images/pic.png", PIXEL_PNG),
    ];
    for (name, data) in entries {
        writer.start_file(name, deflated).unwrap();
        writer.write_all(data).unwrap();
    }

    writer.finish().unwrap();
}

/// An artifact-shaped book without going through the processor.
pub fn dummy_book(title: &str, chapter_count: usize) -> Book {
    let spine: Vec<ChapterContent> = (0..chapter_count)
        .map(|index| ChapterContent {
            id: format!("ch{}", index + 1),
            href: format!("ch{}.html", index + 1),
            title: Some(format!("Chapter {}", index + 1)),
            content: format!("<p>Hello from chapter {}</p>", index + 1),
            text: format!("Hello from chapter {}", index + 1),
            index,
        })
        .collect();

    let toc = spine
        .iter()
        .map(|chapter| TocEntry {
            title: chapter.title.clone().unwrap_or_default(),
            href: chapter.href.clone(),
            file_href: chapter.href.clone(),
            anchor: String::new(),
            chapter_index: Some(chapter.index),
            children: Vec::new(),
        })
        .collect();

    Book {
        metadata: BookMetadata {
            title: title.to_string(),
            language: "en".to_string(),
            authors: vec!["Me".to_string()],
            ..BookMetadata::default()
        },
        spine,
        toc,
        images: HashMap::new(),
        source_file: "test.epub".to_string(),
        processed_at: "2025-01-01T00:00:00+00:00".to_string(),
        version: "3.0".to_string(),
    }
}

/// Write `book` as an artifact under `root/dir_name`.
pub fn write_artifact(root: &Path, dir_name: &str, book: &Book) -> PathBuf {
    let dir = root.join(dir_name);
    std::fs::create_dir_all(&dir).unwrap();
    book.save(&dir).unwrap();
    dir
}

/// The application router over the given library roots.
pub fn test_app(roots: Vec<PathBuf>) -> Router {
    let state = AppState::new(Config::default(), roots);
    routes::router().with_state(state)
}

pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
