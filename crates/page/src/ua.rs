//! Rules every document starts from, ahead of its own stylesheets.

use css::{CssRule, parse_stylesheet};

pub const DEFAULT_STYLESHEET: &str = "
pre { background-color: gray; }
a { color: blue; }
i { font-style: italic; }
b { font-weight: bold; }
small { font-size: 90%; }
big { font-size: 110%; }
input {
    font-size: 16px; font-weight: normal; font-style: normal;
    background-color: lightblue;
}
button {
    font-size: 16px; font-weight: normal; font-style: normal;
    background-color: orange;
}
";

pub fn default_rules() -> Vec<CssRule> {
    parse_stylesheet(DEFAULT_STYLESHEET).rules
}
