// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (admin gate, response headers).

pub mod admin_auth;
pub mod security;
