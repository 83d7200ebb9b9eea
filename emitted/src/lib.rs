//! Parsers emitted by `codegen` at build time from the grammars under
//! `grammars/`, compiled as ordinary modules.

pub mod parens {
    include!(concat!(env!("OUT_DIR"), "/parens.rs"));
}

pub mod expr {
    include!(concat!(env!("OUT_DIR"), "/expr.rs"));
}
