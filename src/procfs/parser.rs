//! Parsers for `/proc` and `/sys` network files.
//!
//! These are pure functions over file contents, testable with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Parses interface names from `/proc/[pid]/net/dev`.
///
/// The first two lines are column headers. Each following line is
/// `<name>: <rx stats...> <tx stats...>`, with the name right-aligned.
pub fn parse_net_dev_names(content: &str) -> Result<Vec<String>, ParseError> {
    let mut names = Vec::new();

    for line in content.lines().skip(2) {
        if line.trim().is_empty() {
            continue;
        }
        let (name, _) = line
            .split_once(':')
            .ok_or_else(|| ParseError::new(format!("missing ':' in net/dev line {:?}", line)))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseError::new("empty interface name in net/dev"));
        }
        names.push(name.to_string());
    }

    Ok(names)
}

/// Parses a sysfs integer attribute such as `ifindex` or `iflink`.
pub fn parse_index(content: &str) -> Result<u32, ParseError> {
    let value = content.trim();
    value
        .parse()
        .map_err(|_| ParseError::new(format!("invalid interface index {:?}", value)))
}

/// Returns the `DEVTYPE` of a sysfs `uevent` file, if it names one.
///
/// veth devices carry no `DEVTYPE`; stacked devices such as `vlan`,
/// `macvlan` or `vxlan` do.
pub fn parse_uevent_devtype(content: &str) -> Option<&str> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("DEVTYPE="))
        .map(str::trim)
        .filter(|devtype| !devtype.is_empty())
}
