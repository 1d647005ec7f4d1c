/*
Copyright 2021 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! A growable bit-vector with boolean algebra and true-bit iteration.
//!
//! Mirrors `examples/original_source/src/bitset.h`'s `BitSet`: a
//! `boost::dynamic_bitset` wrapper with a separate logical `size` distinct
//! from the underlying storage's `capacity`. We keep that distinction here:
//! `words` may have more bits than `len` reports, and reads/iteration never
//! look past `len`.

const WORD_BITS: usize = u64::BITS as usize;

/// A dynamically growable bit-vector.
///
/// `len()` is the logical size; `capacity()` is the number of bits backing
/// storage currently holds (always a multiple of `WORD_BITS`, at least
/// `len()`, and grows by doubling). Bits in `[len, capacity)` are not
/// considered part of the set by any public operation except `!` (`Not`),
/// whose result must only be read within its own `len`.
#[derive(Debug, Clone, Default)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    /// An empty bitset with room for `capacity` bits without reallocating.
    pub fn with_capacity(capacity: usize) -> BitSet {
        BitSet {
            words: vec![0; words_for(capacity)],
            len: 0,
        }
    }

    /// A size-`n` bitset with every bit set to `true`.
    pub fn true_mask(n: usize) -> BitSet {
        let mut bs = BitSet {
            words: vec![u64::MAX; words_for(n)],
            len: n,
        };
        bs.clear_tail_bits();
        bs
    }

    /// A size-`n` bitset with every bit set to `false`.
    pub fn false_mask(n: usize) -> BitSet {
        BitSet {
            words: vec![0; words_for(n)],
            len: n,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bits the backing storage can hold without growing.
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Append a single bit, doubling backing storage when it's exhausted.
    pub fn push_back(&mut self, bit: bool) {
        if self.len == self.capacity() {
            let new_words = (self.words.len() * 2).max(1);
            self.words.resize(new_words, 0);
        }
        self.write_bit(self.len, bit);
        self.len += 1;
    }

    /// Set the bit at `idx`, growing with `false` bits as needed.
    pub fn set(&mut self, idx: usize, bit: bool) {
        while self.len <= idx {
            self.push_back(false);
        }
        self.write_bit(idx, bit);
    }

    /// Read the bit at `idx`. Panics if `idx >= len()`, matching the
    /// original's `operator[]` semantics of reading only defined positions.
    pub fn get(&self, idx: usize) -> bool {
        assert!(idx < self.len, "BitSet index {idx} out of bounds ({})", self.len);
        self.read_bit(idx)
    }

    fn write_bit(&mut self, idx: usize, bit: bool) {
        let (word, mask) = (idx / WORD_BITS, 1u64 << (idx % WORD_BITS));
        if bit {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }
    }

    fn read_bit(&self, idx: usize) -> bool {
        let (word, mask) = (idx / WORD_BITS, 1u64 << (idx % WORD_BITS));
        self.words[word] & mask != 0
    }

    /// Zero out any bits past `len` within the last occupied word so that
    /// whole-word operations (`|`, `^`, the word-at-a-time iterator) never
    /// observe stray bits left over from growth or `!`.
    fn clear_tail_bits(&mut self) {
        if self.len % WORD_BITS != 0 {
            let last = self.len / WORD_BITS;
            let valid_bits = self.len % WORD_BITS;
            self.words[last] &= (1u64 << valid_bits) - 1;
        }
    }

    /// Forward iterator over the indices of `true` bits, lowest first.
    pub fn iter_true(&self) -> TrueBitsForward<'_> {
        TrueBitsForward {
            bitset: self,
            word_idx: 0,
            word: self.words.first().copied().unwrap_or(0) & tail_word_mask(self.len, 0),
        }
    }

    /// Reverse iterator over the indices of `true` bits, highest first.
    pub fn iter_true_rev(&self) -> TrueBitsReverse<'_> {
        let last_word = if self.len == 0 { 0 } else { (self.len - 1) / WORD_BITS };
        let word = self
            .words
            .get(last_word)
            .copied()
            .unwrap_or(0)
            & tail_word_mask(self.len, last_word);
        TrueBitsReverse {
            bitset: self,
            word_idx: last_word as isize,
            word,
            started: self.len > 0,
        }
    }
}

fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS).max(if bits == 0 { 0 } else { 1 })
}

/// Mask out bits at or past `len` within the word that contains `len - 1`.
fn tail_word_mask(len: usize, word_idx: usize) -> u64 {
    let last_word = if len == 0 { return 0 } else { (len - 1) / WORD_BITS };
    if word_idx != last_word {
        return u64::MAX;
    }
    let valid_bits = len - last_word * WORD_BITS;
    if valid_bits >= WORD_BITS {
        u64::MAX
    } else {
        (1u64 << valid_bits) - 1
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter_true().eq(other.iter_true())
    }
}
impl Eq for BitSet {}

impl std::ops::BitAndAssign<&BitSet> for BitSet {
    fn bitand_assign(&mut self, other: &BitSet) {
        self.len = self.len.min(other.len);
        for (i, w) in self.words.iter_mut().enumerate() {
            *w &= other.words.get(i).copied().unwrap_or(0);
        }
        self.clear_tail_bits();
    }
}

impl std::ops::BitAnd<&BitSet> for &BitSet {
    type Output = BitSet;
    fn bitand(self, other: &BitSet) -> BitSet {
        let mut result = self.clone();
        result &= other;
        result
    }
}

impl std::ops::BitOr<&BitSet> for &BitSet {
    type Output = BitSet;
    fn bitor(self, other: &BitSet) -> BitSet {
        let n = self.words.len().max(other.words.len());
        let mut words = vec![0u64; n];
        for i in 0..n {
            words[i] = self.words.get(i).copied().unwrap_or(0) | other.words.get(i).copied().unwrap_or(0);
        }
        let mut result = BitSet {
            words,
            len: self.len.max(other.len),
        };
        result.clear_tail_bits();
        result
    }
}

impl std::ops::BitXor<&BitSet> for &BitSet {
    type Output = BitSet;
    fn bitxor(self, other: &BitSet) -> BitSet {
        let n = self.words.len().max(other.words.len());
        let mut words = vec![0u64; n];
        for i in 0..n {
            words[i] = self.words.get(i).copied().unwrap_or(0) ^ other.words.get(i).copied().unwrap_or(0);
        }
        let mut result = BitSet {
            words,
            len: self.len.max(other.len),
        };
        result.clear_tail_bits();
        result
    }
}

impl std::ops::Not for &BitSet {
    type Output = BitSet;
    fn not(self) -> BitSet {
        // Flip within capacity, not len — callers must only read within len,
        // per the original's `~` semantics.
        let words = self.words.iter().map(|w| !w).collect();
        BitSet {
            words,
            len: self.len,
        }
    }
}

/// Forward iterator over true-bit indices. Skips false bits a word at a
/// time via `trailing_zeros` rather than per-bit looping.
pub struct TrueBitsForward<'a> {
    bitset: &'a BitSet,
    word_idx: usize,
    word: u64,
}

impl Iterator for TrueBitsForward<'_> {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        loop {
            if self.word != 0 {
                let bit = self.word.trailing_zeros() as usize;
                self.word &= self.word - 1; // clear lowest set bit
                return Some(self.word_idx * WORD_BITS + bit);
            }
            self.word_idx += 1;
            if self.word_idx * WORD_BITS >= self.bitset.len {
                return None;
            }
            self.word = self.bitset.words.get(self.word_idx).copied().unwrap_or(0)
                & tail_word_mask(self.bitset.len, self.word_idx);
        }
    }
}

/// Reverse iterator over true-bit indices, highest first.
pub struct TrueBitsReverse<'a> {
    bitset: &'a BitSet,
    word_idx: isize,
    word: u64,
    started: bool,
}

impl Iterator for TrueBitsReverse<'_> {
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        if !self.started {
            return None;
        }
        loop {
            if self.word != 0 {
                let bit = WORD_BITS - 1 - self.word.leading_zeros() as usize;
                self.word &= !(1u64 << bit);
                return Some(self.word_idx as usize * WORD_BITS + bit);
            }
            self.word_idx -= 1;
            if self.word_idx < 0 {
                self.started = false;
                return None;
            }
            self.word = self.bitset.words[self.word_idx as usize]
                & tail_word_mask(self.bitset.len, self.word_idx as usize);
        }
    }
}
