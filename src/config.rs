/// Compiler configuration.
///
/// ## Fields
/// - `inject_tag`:
///   Tag marking the definitions the inject pass works on. The definition is processed if the tag value is truthy.
///   Default: `"inject"`.
/// - `check_inject_types`:
///   If `true`, the type of every injected property is checked to be a known class with a registered service.
///   Default: `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub inject_tag: &'static str,
    pub check_inject_types: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inject_tag: "inject",
            check_inject_types: true,
        }
    }
}
