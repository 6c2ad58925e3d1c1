//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Command-line XML and HTML beautifier and content extractor
#[derive(Parser, Debug, Default)]
#[command(name = "xq")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Format a file
    xq feed.xml

    # Format from stdin with four-space indentation
    curl -s https://example.com/feed.xml | xq --indent 4

    # Every <title> under <item>
    xq -x '//item/title' feed.xml

    # Only the first match
    xq -e '//item[1]/link/text()' feed.xml

    # CSS selector on an HTML page
    curl -s https://example.com | xq -q 'ul.nav > li a'

CONFIG:
    Defaults for --indent, --tab, --color, --no-color and --html are read
    from .xq in the home directory, then the current directory:

        indent = 4
        no-color = true
"#)]
pub struct Cli {
    /// Input files; only the last one is read. Reads stdin when omitted
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Extract every node matching an XPath expression
    #[arg(short = 'x', long, value_name = "EXPR")]
    pub xpath: Option<String>,

    /// Extract the first node matching an XPath expression
    #[arg(short = 'e', long, value_name = "EXPR")]
    pub extract: Option<String>,

    /// Extract every node matching a CSS selector
    #[arg(short = 'q', long, value_name = "SELECTOR")]
    pub query: Option<String>,

    /// Indent with N spaces (1-8, default 2)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub indent: Option<i64>,

    /// Indent with tabs
    #[arg(long)]
    pub tab: bool,

    /// Force colored output
    #[arg(short = 'c', long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Parse the input as HTML instead of detecting it
    #[arg(short = 'm', long)]
    pub html: bool,

    /// Log pipeline decisions and parser recovery to stderr
    #[arg(long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["xq", "-x", "//a", "-c", "-m", "in.xml"]);
        assert_eq!(cli.xpath.as_deref(), Some("//a"));
        assert!(cli.color);
        assert!(cli.html);
        assert_eq!(cli.files, vec![PathBuf::from("in.xml")]);
    }

    #[test]
    fn test_several_files_are_accepted() {
        let cli = Cli::parse_from(["xq", "a.xml", "b.xml"]);
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn test_out_of_range_indent_parses() {
        let cli = Cli::parse_from(["xq", "--indent", "-1"]);
        assert_eq!(cli.indent, Some(-1));
    }
}
