//! # reaproject
//!
//! Read, inspect and script REAPER project files (`.rpp`).
//!
//! A project file is a tree of chunks:
//!
//!     <REAPER_PROJECT 0.1 "7.0/linux-x86_64" 1700000000
//!       TEMPO 120 4 4
//!       <TRACK {6A1B2C3D-0000-4000-8000-000000000001}
//!         NAME Kick
//!       >
//!     >
//!
//! The pipeline is
//!
//!     bytes -> parser -> Chunk -> projection -> transform script -> projection -> Chunk -> serializer -> bytes
//!
//! File Layout
//!
//! src/rpp
//!   ├── chunk, token, parser, serializer    The file format
//!   ├── projection                          Chunk trees as plain data
//!   ├── document                            The set of loaded projects
//!   ├── transform                           Sandboxed scripts and the built-in catalog
//!   └── formats                             rpp / json / yaml / treeviz renderings
//!
//! For testing guidelines, see the [testing module](rpp::testing).

pub mod rpp;
