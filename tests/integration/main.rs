//! End-to-end tests driving the full router against the in-memory store.

mod helpers;

mod bulk;
mod catalog;
mod reservations;
mod slots;
