// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Source positions attached to tokens and AST nodes.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A location in the input text.
///
/// `offset` is zero-based and counted in characters, `line` is 1-based and
/// `column` is 1-based. The all-zero value is the sentinel for "no position"
/// (an absent token); see [`Pos::is_valid`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pos {
    pub offset: i32,
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(offset: i32, line: u32, column: u32) -> Self {
        Pos {
            offset,
            line,
            column,
        }
    }

    /// Returns true unless this is the sentinel "no position" value.
    pub fn is_valid(&self) -> bool {
        *self != Pos::default()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("-");
        }
        write!(f, "{}", self.line)?;
        if self.column != 0 {
            write!(f, ":{}", self.column)?;
        }
        Ok(())
    }
}
