// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

pub mod broker;
pub mod channel;
pub mod config;
pub mod definition;
pub mod errors;
pub mod exchange;
pub mod queue;
pub mod topology;
