pub mod context;
pub mod decoder;
pub mod encoder;
pub mod entries;
pub mod helpers;
pub mod opcodes;
pub mod template;

use rpcgen_types::SpecTable;
use serde_derive::Serialize;

/// The kinds of dispatch context the generator knows about. Client, server
/// and wrapper contexts are plain function-pointer tables; the encoder and
/// decoder contexts embed the client and server tables respectively.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Client,
    Server,
    Wrapper,
    Encoder,
    Decoder,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Client => "client",
            Side::Server => "server",
            Side::Wrapper => "wrapper",
            Side::Encoder => "encoder",
            Side::Decoder => "decoder",
        }
    }
}

/// One output file, named relative to its output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub contents: String,
}

impl GeneratedFile {
    fn new(name: String, contents: String) -> Self {
        Self { name, contents }
    }
}

/// The output bundles requested on the command line.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Bundle {
    /// Client side: opcodes, client proc/context/entry/ftable, encoder.
    Encoder,
    /// Server side: opcodes, server proc/context, decoder.
    Decoder,
    /// Pass-through wrapper: wrapper proc/context/entry/ftable.
    Wrapper,
}

/// Render every file of `bundle`, in a fixed order.
pub fn generate_bundle(table: &SpecTable, bundle: Bundle) -> Vec<GeneratedFile> {
    let base = &table.basename;
    let mut files = Vec::new();

    let dispatch_files = |files: &mut Vec<GeneratedFile>, side: Side| {
        let s = side.as_str();
        files.push(GeneratedFile::new(
            format!("{}_{}_proc.h", base, s),
            context::emit_proc_types(table, side),
        ));
        files.push(GeneratedFile::new(
            format!("{}_{}_context.h", base, s),
            context::emit_context_header(table, side),
        ));
        files.push(GeneratedFile::new(
            format!("{}_{}_context.cpp", base, s),
            context::emit_context_impl(table, side),
        ));
    };

    match bundle {
        Bundle::Encoder => {
            files.push(GeneratedFile::new(format!("{}_opcodes.h", base), opcodes::emit_opcodes(table)));
            dispatch_files(&mut files, Side::Client);
            files.push(GeneratedFile::new(
                format!("{}_ftable.h", base),
                entries::emit_func_table(table, Side::Client),
            ));
            files.push(GeneratedFile::new(
                format!("{}_entry.cpp", base),
                entries::emit_entry_points(table, Side::Client),
            ));
            files.push(GeneratedFile::new(format!("{}_enc.h", base), encoder::emit_encoder_header(table)));
            files.push(GeneratedFile::new(format!("{}_enc.cpp", base), encoder::emit_encoder_impl(table)));
        }
        Bundle::Decoder => {
            files.push(GeneratedFile::new(format!("{}_opcodes.h", base), opcodes::emit_opcodes(table)));
            dispatch_files(&mut files, Side::Server);
            files.push(GeneratedFile::new(format!("{}_dec.h", base), decoder::emit_decoder_header(table)));
            files.push(GeneratedFile::new(format!("{}_dec.cpp", base), decoder::emit_decoder_impl(table)));
        }
        Bundle::Wrapper => {
            dispatch_files(&mut files, Side::Wrapper);
            files.push(GeneratedFile::new(
                format!("{}_wrapper_ftable.h", base),
                entries::emit_func_table(table, Side::Wrapper),
            ));
            files.push(GeneratedFile::new(
                format!("{}_wrapper_entry.cpp", base),
                entries::emit_entry_points(table, Side::Wrapper),
            ));
        }
    }

    files
}
