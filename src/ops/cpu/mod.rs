//! CPU implementation of the random engine kernel backend.

mod random_engine;
