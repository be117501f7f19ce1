// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for the bounding box labeler.

pub mod annotation;
pub mod project;
