// tests/import_builder.rs

mod common;
use crate::common::{OUT, SRC, init_tracing, mock_resolver};

use std::error::Error;
use std::path::{Path, PathBuf};

use specwatch::build::{BuildOptions, DocumentBuilder, ImportBuilder};
use specwatch::errors::BuildError;
use specwatch::types::AssetsMode;

type TestResult = Result<(), Box<dyn Error>>;

fn entry() -> PathBuf {
    Path::new(SRC).join("index.html")
}

fn builder() -> ImportBuilder {
    ImportBuilder::with_assets("/* css */", "/* js */")
}

#[tokio::test]
async fn document_without_imports_is_returned_verbatim() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(entry(), "<!doctype html>\n<h1>Title</h1>\n");

    let doc = builder()
        .build(&entry(), &resolver, &BuildOptions::default())
        .await?;

    assert_eq!(doc.to_html(), "<!doctype html>\n<h1>Title</h1>\n");
    assert!(doc.assets().is_empty());
    Ok(())
}

#[tokio::test]
async fn imports_expand_recursively_relative_to_importer() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(
        entry(),
        "<body><emu-import href=\"clauses/intro.html\"></emu-import></body>",
    );
    fs.add_file(
        format!("{SRC}/clauses/intro.html"),
        "intro<emu-import href=\"../shared/note.html\" />",
    );
    fs.add_file(format!("{SRC}/shared/note.html"), "note");

    let doc = builder()
        .build(&entry(), &resolver, &BuildOptions::default())
        .await?;

    assert_eq!(
        doc.to_html(),
        "<body><emu-import href=\"clauses/intro.html\">intro\
         <emu-import href=\"../shared/note.html\">note</emu-import>\
         </emu-import></body>"
    );
    Ok(())
}

#[tokio::test]
async fn imports_prefer_generated_copies_in_output() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(entry(), "<emu-import href=\"table.html\"></emu-import>");
    fs.add_file(format!("{SRC}/table.html"), "source");
    fs.add_file(format!("{OUT}/table.html"), "generated");

    let doc = builder()
        .build(&entry(), &resolver, &BuildOptions::default())
        .await?;

    assert_eq!(
        doc.to_html(),
        "<emu-import href=\"table.html\">generated</emu-import>"
    );
    Ok(())
}

#[tokio::test]
async fn import_cycle_is_reported_with_its_chain() {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(entry(), "<emu-import href=\"a.html\"></emu-import>");
    fs.add_file(format!("{SRC}/a.html"), "<emu-import href=\"b.html\"></emu-import>");
    fs.add_file(format!("{SRC}/b.html"), "<emu-import href=\"./a.html\"></emu-import>");

    let err = builder()
        .build(&entry(), &resolver, &BuildOptions::default())
        .await
        .unwrap_err();

    match err {
        BuildError::ImportCycle { chain } => {
            assert_eq!(chain[1..], ["a.html", "b.html", "a.html"]);
        }
        other => panic!("expected import cycle, got {other:?}"),
    }
}

#[tokio::test]
async fn same_file_imported_twice_is_not_a_cycle() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(
        entry(),
        "<emu-import href=\"x.html\"></emu-import><emu-import href=\"x.html\"></emu-import>",
    );
    fs.add_file(format!("{SRC}/x.html"), "X");

    let doc = builder()
        .build(&entry(), &resolver, &BuildOptions::default())
        .await?;
    assert_eq!(doc.to_html().matches(">X<").count(), 2);
    Ok(())
}

#[tokio::test]
async fn href_is_found_in_any_position_and_quoting() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(
        entry(),
        "<emu-import href='single.html'></emu-import>\n\
         <emu-import id=\"sec\" href=\"after-id.html\"></emu-import>\n\
         <EMU-IMPORT HREF=bare.html />",
    );
    fs.add_file(format!("{SRC}/single.html"), "one");
    fs.add_file(format!("{SRC}/after-id.html"), "two");
    fs.add_file(format!("{SRC}/bare.html"), "three");

    let doc = builder()
        .build(&entry(), &resolver, &BuildOptions::default())
        .await?;

    assert_eq!(
        doc.to_html(),
        "<emu-import href='single.html'>one</emu-import>\n\
         <emu-import id=\"sec\" href=\"after-id.html\">two</emu-import>\n\
         <emu-import HREF=bare.html>three</emu-import>"
    );
    Ok(())
}

#[tokio::test]
async fn import_without_href_is_left_alone() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(
        entry(),
        "<emu-import data-href=\"x.html\"></emu-import><emu-import href=\"y.html\"/>",
    );
    fs.add_file(format!("{SRC}/y.html"), "Y");

    let doc = builder()
        .build(&entry(), &resolver, &BuildOptions::default())
        .await?;

    assert_eq!(
        doc.to_html(),
        "<emu-import data-href=\"x.html\"></emu-import><emu-import href=\"y.html\">Y</emu-import>"
    );
    Ok(())
}

#[tokio::test]
async fn missing_import_fails_with_fetch_error() {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(entry(), "<emu-import href=\"gone.html\"></emu-import>");

    let err = builder()
        .build(&entry(), &resolver, &BuildOptions::default())
        .await
        .unwrap_err();

    match err {
        BuildError::Fetch { name, source } => {
            assert_eq!(name, "gone.html");
            assert_eq!(source.name(), "gone.html");
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn assets_none_emits_files_without_touching_document() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(entry(), "<html><head></head><body></body></html>");

    let options = BuildOptions {
        assets: AssetsMode::None,
        css_out: Some(Path::new(OUT).join("ecmarkup.css")),
        js_out: Some(Path::new(OUT).join("ecmarkup.js")),
    };
    let doc = builder().build(&entry(), &resolver, &options).await?;

    assert_eq!(doc.to_html(), "<html><head></head><body></body></html>");
    let paths: Vec<_> = doc.assets().iter().map(|a| a.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            Path::new(OUT).join("ecmarkup.css"),
            Path::new(OUT).join("ecmarkup.js")
        ]
    );
    assert_eq!(doc.assets()[0].contents, "/* css */");
    Ok(())
}

#[tokio::test]
async fn assets_external_links_emitted_files_in_head() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(entry(), "<html><head><title>t</title></HEAD><body></body></html>");

    let options = BuildOptions {
        assets: AssetsMode::External,
        css_out: Some(Path::new(OUT).join("ecmarkup.css")),
        js_out: Some(Path::new(OUT).join("ecmarkup.js")),
    };
    let doc = builder().build(&entry(), &resolver, &options).await?;

    assert_eq!(
        doc.to_html(),
        "<html><head><title>t</title>\
         <link rel=\"stylesheet\" href=\"ecmarkup.css\">\n\
         <script src=\"ecmarkup.js\" defer></script>\n\
         </HEAD><body></body></html>"
    );
    assert_eq!(doc.assets().len(), 2);
    Ok(())
}

#[tokio::test]
async fn assets_inline_embeds_and_emits_nothing() -> TestResult {
    init_tracing();
    let (fs, resolver) = mock_resolver();
    fs.add_file(entry(), "<p>no head</p>");

    let options = BuildOptions {
        assets: AssetsMode::Inline,
        css_out: Some(Path::new(OUT).join("ecmarkup.css")),
        js_out: Some(Path::new(OUT).join("ecmarkup.js")),
    };
    let doc = builder().build(&entry(), &resolver, &options).await?;

    assert_eq!(
        doc.to_html(),
        "<style>/* css */</style>\n<script>/* js */</script>\n<p>no head</p>"
    );
    assert!(doc.assets().is_empty());
    Ok(())
}

#[tokio::test]
async fn bundled_assets_are_non_empty() -> TestResult {
    let (fs, resolver) = mock_resolver();
    fs.add_file(entry(), "x");

    let options = BuildOptions {
        assets: AssetsMode::None,
        css_out: Some(Path::new(OUT).join("ecmarkup.css")),
        js_out: None,
    };
    let doc = ImportBuilder::new()
        .build(&entry(), &resolver, &options)
        .await?;

    assert_eq!(doc.assets().len(), 1);
    assert!(!doc.assets()[0].contents.trim().is_empty());
    Ok(())
}
