//! # locid - Compact Call-Site Identifiers
//!
//! Programs tag interesting call sites with [`locid_common::loc!`], which
//! stores a `(function, file, line)` record in the `loc_ids` link section and
//! hands back a 32-bit [`LocationId`](locid_common::LocationId): the signed
//! byte offset of that record from a fixed anchor record. Logging an id costs
//! four bytes; turning it back into a call site happens later.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       User Application                          │
//! │        loc!() ──► LocationRecord in loc_ids ──► LocationId       │
//! └──────────────┬──────────────────────────────────┬───────────────┘
//!                │ id.resolve()                     │ compiled binary
//!                ▼                                  ▼
//! ┌──────────────────────────┐   ┌───────────────────────────────────┐
//! │  In-process resolver     │   │        locid (This Crate)         │
//! │  (locid-common)          │   │                                   │
//! │  anchor + id → record    │   │  ┌─────────┐   ┌──────────────┐   │
//! └──────────────────────────┘   │  │  image  │──▶│   regions    │   │
//!                                │  │ (object)│   │ locate/patch │   │
//!                                │  └─────────┘   └──────┬───────┘   │
//!                                │                       ▼           │
//!                                │  ┌─────────┐   ┌──────────────┐   │
//!                                │  │ export  │◀──│    decode    │   │
//!                                │  │ (json)  │   │ table/lookup │   │
//!                                │  └─────────┘   └──────────────┘   │
//!                                └───────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`image`]: opens ELF and Mach-O files; section table, chunked section
//!   reads, symbols and dynamic relocations. Mach-O images whose pointers are
//!   stored as chained fixups (the default for recent deployment targets) are
//!   not supported: their records decode as out-of-range addresses
//! - [`regions`]: finds the table and string sections by exact name, patches
//!   relative relocations, translates addresses into string offsets
//! - [`decode`]: lazy table decoding with per-entry errors, reports, and the
//!   [`LocationTable`](decode::LocationTable) for out-of-process id lookup
//! - [`export`]: JSON rendering of a decode report
//! - [`config`]: section names, anchor symbol and layout overrides
//! - [`domain`]: target layout, decoded locations, error types
//! - [`preflight`]: checks run by the CLI before decoding
//! - [`cli`]: command-line argument parsing
//!
//! ## Typical Usage
//!
//! ```bash
//! # List every tagged call site of a binary
//! locid ./my-app
//!
//! # Look up ids the program logged
//! locid ./my-app -- -48 24
//! ```
//!
//! ## Key Concepts
//!
//! - **Anchor**: the record at offset zero; never a real call site
//! - **Sentinel slot**: a record with both string references null (the anchor
//!   or zero fill), skipped by the decoder
//! - **Target layout**: pointer width and byte order of the decoded binary,
//!   independent of the host running the decoder

pub mod cli;
pub mod config;
pub mod decode;
pub mod domain;
pub mod export;
pub mod image;
pub mod preflight;
pub mod regions;
