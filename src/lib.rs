//! # Altair Ego
//!
//! Emulating Altair BASIC 32K Rev. 3.2.
//! ```text
//! Altair Ego: Emulating Altair BASIC 32K Rev. 3.2
//! OK
//! █
//! ```
//!
//! Lines are lexed and parsed one at a time; numbered lines land in the
//! program store and direct lines execute immediately. `RUN` walks the
//! stored tree with a resumable cursor so `GOTO`, `GOSUB`/`RETURN`, and
//! `FOR`/`NEXT` can jump anywhere and still leave the call and loop
//! stacks consistent.

#[macro_use]
pub mod lang;
pub mod mach;
pub mod term;
