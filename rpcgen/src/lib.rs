/* RPC wire-protocol generator
 *
 * Turns an entry-point specification (plus an attribute overlay) into the
 * client-side encoder, the server-side decoder and the dispatch plumbing
 * around them. Both sides are rendered from the same packet layout plan so
 * that they agree on every byte offset.
 */

pub mod cmds;
pub mod codegen;
pub mod diag;
pub mod error;
pub mod layout;
pub mod output;
pub mod spec;

pub use diag::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{GenError, GenResult};
