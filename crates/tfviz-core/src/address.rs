//! Terraform address parsing: `module.a.module.b.aws_instance.x`

const MODULE_KEYWORD: &str = "module";

/// Module path and local resource name of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress<'a> {
    /// Module names from outermost to innermost.
    pub modules: Vec<&'a str>,
    /// What follows the module path. `None` when the address names a module itself.
    pub resource: Option<&'a str>,
}

impl<'a> ParsedAddress<'a> {
    fn top_level(address: &'a str) -> Self {
        ParsedAddress {
            modules: Vec::new(),
            resource: Some(address),
        }
    }

    /// True when the address is a module call such as `module.a.module.b`.
    pub fn is_module(&self) -> bool {
        self.resource.is_none() && !self.modules.is_empty()
    }
}

/// Split on `.` outside of `[...]` and `"..."`. Returns `(start, end)` byte ranges,
/// or `None` when brackets or quotes are unbalanced.
fn segment_ranges(address: &str) -> Option<Vec<(usize, usize)>> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in address.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            '.' if depth == 0 => {
                ranges.push((start, i));
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes || depth != 0 {
        return None;
    }
    ranges.push((start, address.len()));
    Some(ranges)
}

/// Parse an address into its module path and local name.
///
/// Anything that does not follow the `module.<name>` convention is treated as
/// a top-level resource named by the whole address.
pub fn parse_address(address: &str) -> ParsedAddress<'_> {
    let Some(ranges) = segment_ranges(address) else {
        return ParsedAddress::top_level(address);
    };
    let segment = |i: usize| &address[ranges[i].0..ranges[i].1];

    let mut modules = Vec::new();
    let mut i = 0;
    while i < ranges.len() && segment(i) == MODULE_KEYWORD {
        if i + 1 >= ranges.len() || segment(i + 1).is_empty() {
            return ParsedAddress::top_level(address);
        }
        modules.push(segment(i + 1));
        i += 2;
    }

    if i == ranges.len() {
        return ParsedAddress {
            modules,
            resource: None,
        };
    }
    let rest = &address[ranges[i].0..];
    if ranges[i..].iter().any(|&(s, e)| s == e) {
        return ParsedAddress::top_level(address);
    }
    ParsedAddress {
        modules,
        resource: Some(rest),
    }
}

/// Canonical address of the module at `path`, e.g. `module.a.module.b`.
pub fn module_address(path: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, name) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(MODULE_KEYWORD);
        out.push('.');
        out.push_str(name.as_ref());
    }
    out
}
