// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use khora_core::asset::{Asset, AssetType};

/// Shader source text, kept verbatim for the shader compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// The full source text.
    pub source: String,
    /// Targets of `#include` directives, in order of appearance.
    pub includes: Vec<String>,
}

impl ShaderSource {
    /// Builds a shader asset, collecting its `#include "..."` / `#include <...>` targets.
    pub fn parse(source: String) -> Self {
        let includes = source
            .lines()
            .filter_map(|line| line.trim_start().strip_prefix("#include"))
            .filter_map(|rest| {
                let rest = rest.trim();
                let (open, close) = match rest.chars().next()? {
                    '"' => ('"', '"'),
                    '<' => ('<', '>'),
                    _ => return None,
                };
                let inner = rest.strip_prefix(open)?;
                inner.find(close).map(|end| inner[..end].to_string())
            })
            .collect();
        Self { source, includes }
    }
}

impl Asset for ShaderSource {
    fn asset_type(&self) -> AssetType {
        AssetType::Shader
    }
}

/// A gameplay script. The language is taken from the file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Lower-cased source extension (`lua`, `cs`, ...).
    pub language: String,
    /// The full source text.
    pub source: String,
}

impl Asset for Script {
    fn asset_type(&self) -> AssetType {
        AssetType::Script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_includes_are_collected() {
        let shader = ShaderSource::parse(
            "#include \"common.inc\"\n  #include <lighting.inc>\n#include broken\nvoid main() {}\n"
                .to_string(),
        );
        assert_eq!(shader.includes, ["common.inc", "lighting.inc"]);
    }
}
