//! End-to-end runs through the producer thread and conduit.

use std::io::{self, Cursor, Read};

use xq_dom::Grammar;
use xq_engine::{Error, Job, PipelineError, QueryRequest, run, run_pipeline};
use xq_format::{ColorMode, FormatOptions};
use xq_query::{QueryError, QueryLanguage, QueryMode};

fn job(grammar: Option<Grammar>, query: Option<QueryRequest>) -> Job {
    Job {
        grammar,
        query,
        options: FormatOptions::new(None, false, ColorMode::Disabled).unwrap(),
        is_tty: false,
    }
}

fn input(text: &str) -> Cursor<Vec<u8>> {
    Cursor::new(text.as_bytes().to_vec())
}

/// Run through the pipeline, reading everything the producer writes.
fn drain(text: &str, job: Job) -> (Result<(), Error>, String) {
    let mut out = Vec::new();
    let result = run_pipeline(input(text), job, |reader| {
        let _ = reader.read_to_end(&mut out)?;
        Ok(())
    });
    (result, String::from_utf8(out).unwrap())
}

fn large_document(nodes: usize) -> String {
    let mut doc = String::from("<root>");
    for i in 0..nodes {
        doc.push_str(&format!("<item n=\"{i}\">value {i}</item>"));
    }
    doc.push_str("</root>");
    doc
}

#[test]
fn test_format_scenario() {
    let (result, out) = drain("<a><b>1</b><c>2</c></a>", job(None, None));
    result.unwrap();
    assert_eq!(out, "<a>\n  <b>1</b>\n  <c>2</c>\n</a>\n");
}

#[test]
fn test_xpath_scenario() {
    let query = QueryRequest::new("//b[@id='y']", QueryLanguage::XPath, QueryMode::Multi);
    let (result, out) = drain(
        r#"<a><b id="x">1</b><b id="y">2</b></a>"#,
        job(None, Some(query)),
    );
    result.unwrap();
    assert_eq!(out, "<b id=\"y\">2</b>\n");
}

#[test]
fn test_css_scenario() {
    let query = QueryRequest::new(".k", QueryLanguage::Css, QueryMode::Multi);
    let (result, out) = drain(
        r#"<div><span class="k">v</span></div>"#,
        job(None, Some(query)),
    );
    result.unwrap();
    assert_eq!(out, "<span class=\"k\">v</span>\n");
}

#[test]
fn test_pipeline_matches_synchronous_run() {
    let doc = large_document(500);
    let mut direct = Vec::new();
    run(input(&doc), &job(None, None), &mut direct).unwrap();

    let (result, piped) = drain(&doc, job(None, None));
    result.unwrap();
    assert_eq!(piped.as_bytes(), direct.as_slice());
}

#[test]
fn test_consumer_leaving_early_is_success() {
    let doc = large_document(10_000);
    let mut first = [0; 1];
    let result = run_pipeline(input(&doc), job(None, None), |reader| {
        reader.read_exact(&mut first)
    });
    assert!(result.is_ok(), "{result:?}");
    assert_eq!(&first, b"<");
}

#[test]
fn test_consumer_broken_pipe_is_success() {
    let doc = large_document(100);
    let result = run_pipeline(input(&doc), job(None, None), |_| {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    });
    assert!(result.is_ok());
}

#[test]
fn test_consumer_failure_is_reported() {
    let result = run_pipeline(input("<a/>"), job(None, None), |_| {
        Err(io::Error::other("pager crashed"))
    });
    assert!(matches!(result, Err(Error::Pipeline(PipelineError::Io(_)))));
}

#[test]
fn test_html_tolerance() {
    let (xml, out) = drain("<div><p>text", job(None, None));
    assert!(matches!(xml, Err(Error::Parse(_))));
    assert!(out.is_empty());

    let (html, out) = drain("<div><p>text", job(Some(Grammar::Html), None));
    html.unwrap();
    assert_eq!(out, "<div>\n  <p>text</p>\n</div>\n");
}

#[test]
fn test_sniffed_html_is_tolerant() {
    let (result, out) = drain("<!DOCTYPE html><p>a<p>b", job(None, None));
    result.unwrap();
    assert_eq!(out, "<!DOCTYPE html>\n<p>a</p>\n<p>b</p>\n");
}

#[test]
fn test_query_errors_are_reported() {
    let missing = QueryRequest::new("//x", QueryLanguage::XPath, QueryMode::Single);
    let (result, out) = drain("<a/>", job(None, Some(missing)));
    assert!(matches!(result, Err(Error::Query(QueryError::NoMatch { .. }))));
    assert!(out.is_empty());

    let invalid = QueryRequest::new("a >", QueryLanguage::Css, QueryMode::Multi);
    let (result, _) = drain("<a/>", job(None, Some(invalid)));
    assert!(matches!(
        result,
        Err(Error::Query(QueryError::InvalidExpression { .. }))
    ));
}

struct FailingInput;

impl Read for FailingInput {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("read failed"))
    }
}

#[test]
fn test_input_failure_is_reported() {
    let result = run_pipeline(FailingInput, job(None, None), |reader| {
        let _ = reader.read_to_end(&mut Vec::new())?;
        Ok(())
    });
    assert!(matches!(result, Err(Error::Pipeline(PipelineError::Io(_)))));
}
