// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod db;
pub mod errors;
pub mod models;
pub mod utils;

pub mod recurrence;
pub mod generator;
pub mod materializer;
pub mod planfact;
pub mod forecast;

pub mod commands;
