#![forbid(unsafe_code)]

//! Core: geometry, pointer events, observables, and motion primitives.
//!
//! # Role in Fractile
//! `fractile-core` is the substrate layer. It owns the value types every other
//! crate speaks in (points, rectangles, affine transforms), the observable
//! values and collections the model exposes, and the spring integrator that
//! moves pieces between frames.
//!
//! # How it fits in the system
//! `fractile-model` builds containers, cells, and pieces out of
//! [`reactive::Observable`] and [`reactive::ObservableList`].
//! `fractile-scene` consumes both, plus [`geometry`] and [`animation`], to
//! place pieces into cells.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod reactive;
