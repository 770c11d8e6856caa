//! Prints the command-line options table as markdown.

fn main() {
    print!("{}", carscope_cli::render_options_markdown());
}
