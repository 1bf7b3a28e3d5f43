// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod aggregate;
pub mod audit;
pub mod balance;
pub mod budgets;
pub mod categories;
pub mod transactions;
