/// Knobs threaded through a parse run.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Resolve the B-rep graph embedded in 3DSOLID entities. When false the
    /// proprietary text is still de-obfuscated but the record graph is left
    /// unresolved.
    pub resolve_solid_bodies: bool,
    /// Recursion ceiling for the ACIS resolver. Cycles are broken by
    /// memoization; this caps non-repeating but unbounded chains.
    pub max_resolve_depth: u32,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            resolve_solid_bodies: true,
            max_resolve_depth: 100,
        }
    }
}
