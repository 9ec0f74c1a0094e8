use crate::{command::Command, commands};

pub mod reader;
pub mod writer;

pub fn get_aci_commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(commands::parse_tree::ParseTree::new()),
        Box::new(commands::validate::Validate::new()),
        Box::new(commands::format::Format::new()),
    ]
}

const ATTRIBUTE_PREFIX: &str = "aci:";

///
/// One instruction as found in an input file, with the line it starts on.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub line_num: usize,
    pub text: String,
}

///
/// Splits file content into instructions. Blank lines and `#` comments end
/// the current instruction and are skipped. A line starting with a single
/// space continues the previous one (LDIF folding). A leading `aci:`
/// attribute name is removed.
///
pub fn logical_lines(content: &str) -> Vec<LogicalLine> {
    let mut lines = vec![];
    let mut current: Option<LogicalLine> = None;
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            lines.extend(current.take());
            continue;
        }
        if let (Some(folded), Some(current)) = (line.strip_prefix(' '), current.as_mut()) {
            current.text.push_str(folded);
            continue;
        }
        lines.extend(current.take());
        current = Some(LogicalLine {
            line_num: idx + 1,
            text: strip_attribute_prefix(line.trim()).to_string(),
        });
    }
    lines.extend(current);
    lines
        .into_iter()
        .map(|mut l| {
            l.text = l.text.trim().to_string();
            l
        })
        .filter(|l| !l.text.is_empty())
        .collect()
}

fn strip_attribute_prefix(line: &str) -> &str {
    match line.get(..ATTRIBUTE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(ATTRIBUTE_PREFIX) => {
            line[ATTRIBUTE_PREFIX.len()..].trim_start()
        }
        _ => line,
    }
}
