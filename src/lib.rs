//! # filmes
//!
//! Client core for the filmes catalogue: an authenticated session context and
//! a record store that keeps an in-memory list of movie records in sync with
//! the `/api/filmes` REST resource.
//!
//! DESIGN
//! ======
//! `SessionContext` owns identity claims and the cached bearer credential.
//! It is constructed explicitly and injected into `RecordStore`, which talks
//! to the backend through the `FilmesApi` seam. `FilmeApp` layers the screen
//! state (form, error banner, confirmation gate) on top for the CLI.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod filme;
pub mod session;
pub mod store;
