// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod doctor;
pub mod forecast;
pub mod loans;
pub mod occurrences;
pub mod pending;
pub mod planned;
pub mod transactions;
