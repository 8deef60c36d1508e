//! Typed errors that callers need to tell apart from ordinary failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FusionError {
    /// A smell-overall file name carries no `<major>.<minor>.<patch>` token.
    /// The naming convention is required, so this aborts the whole run.
    #[error(
        "output file name ({filename}) is wrong format: cannot fetch version/project pair \
         (expected <project>-<version>-...-overall.csv)"
    )]
    MalformedFilename { filename: String },
}
