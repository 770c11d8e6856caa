//! Help overlay text, compiled in from `help-strings/*.txt`.

use crate::report::Page;

macro_rules! include_help {
    ($name:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/src/help-strings/",
            $name,
            ".txt"
        ))
    };
}

pub fn main() -> &'static str {
    include_help!("main")
}

pub fn page(page: Page) -> &'static str {
    match page {
        Page::Home => include_help!("home"),
        Page::Univariate => include_help!("univariate"),
        Page::Multivariate => include_help!("multivariate"),
    }
}

/// Global keys followed by the page's own help.
pub fn for_page(page: Page) -> String {
    format!("{}\n{}", main(), self::page(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_page_appends_page_help() {
        for p in Page::ALL {
            let text = for_page(p);
            assert!(text.starts_with(main()));
            assert!(text.ends_with(page(p)));
        }
    }
}
