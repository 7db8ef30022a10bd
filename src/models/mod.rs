// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod account;
pub mod requests;
pub mod routine;

pub use account::{Account, AccountView, NewAccount, ProfileView};
pub use requests::{
    LoginRequest, NewRoutineRequest, ProfileUpdate, ProfileUpdateRequest, RegisterRequest,
    StepsRequest, WireNumber,
};
pub use routine::Routine;
