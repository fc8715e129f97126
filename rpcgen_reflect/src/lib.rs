/* RPC wire reflection
 *
 * A byte-exact Rust model of the generated encoder and decoder. Encodes
 * calls against a spec table, walks captured packet streams the way the
 * generated decode loop does, and reports what each packet carried.
 */

pub mod decode;
pub mod encode;
pub mod errors;
pub mod formatter;
pub mod value;

pub use decode::{CallHandler, Decoder, MemoryStream, ReplyStream};
pub use encode::Encoder;
pub use errors::{ReflectError, ReflectResult};
pub use value::{Arg, ArgValue, DecodeOutcome, DecodedArg, DecodedCall, Halt};
