//! Per-direction header dictionaries.
//!
//! A dictionary pairs a 64-bit presence word with one value slot per known
//! header of its direction; everything else lands in an insertion-ordered
//! side map. Direction dispatch is static: [`RequestHeaders`],
//! [`ResponseHeaders`] and [`ResponseTrailers`] are one generic storage type
//! instantiated with a direction marker, so the request-only parse entry
//! points and the response-only serializer exist only where they apply.
//!
//! A dictionary is single-owner per HTTP message: created empty, mutated
//! while a message is parsed or built, optionally frozen, serialized, then
//! cleared (or reuse-reset) for the next cycle on the connection.

pub mod encoding;

mod iter;
mod request;
mod response;
mod trailers;

use std::marker::PhantomData;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::HeaderError;
use crate::gen::{self, DirectionPlan};
use crate::registry::{Direction, KnownHeader};

pub use encoding::ValueEncoding;
pub use iter::HeaderIter;

/// Request direction marker.
#[derive(Debug)]
pub struct Request;

/// Response direction marker.
#[derive(Debug)]
pub struct Response;

/// Response-trailers direction marker.
#[derive(Debug)]
pub struct Trailers;

/// Static direction selection for [`Headers`].
pub trait DirectionKind {
    const DIRECTION: Direction;
    /// Serialized directions sanitize value characters on `set`/`add`.
    const VALIDATES_VALUES: bool;
    fn plan() -> &'static DirectionPlan;
}

impl DirectionKind for Request {
    const DIRECTION: Direction = Direction::Request;
    const VALIDATES_VALUES: bool = false;
    fn plan() -> &'static DirectionPlan {
        gen::request_plan()
    }
}

impl DirectionKind for Response {
    const DIRECTION: Direction = Direction::Response;
    const VALIDATES_VALUES: bool = true;
    fn plan() -> &'static DirectionPlan {
        gen::response_plan()
    }
}

impl DirectionKind for Trailers {
    const DIRECTION: Direction = Direction::Trailers;
    const VALIDATES_VALUES: bool = true;
    fn plan() -> &'static DirectionPlan {
        gen::trailers_plan()
    }
}

/// The request header dictionary.
pub type RequestHeaders = Headers<Request>;

/// The response header dictionary.
pub type ResponseHeaders = Headers<Response>;

/// The response trailer dictionary.
pub type ResponseTrailers = Headers<Trailers>;

/// The ordered values of one header. Cloning shares the backing buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderValues {
    values: Vec<Bytes>,
}

impl HeaderValues {
    fn single(value: Bytes) -> Self {
        Self { values: vec![value] }
    }

    fn from_slice(values: &[Bytes]) -> Self {
        Self { values: values.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<&Bytes> {
        self.values.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bytes> {
        self.values.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderValues {
    type Item = &'a Bytes;
    type IntoIter = std::slice::Iter<'a, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<'a> PartialEq<&'a str> for HeaderValues {
    fn eq(&self, other: &&'a str) -> bool {
        self.values.len() == 1 && self.values[0].as_ref() == other.as_bytes()
    }
}

impl<'a, const N: usize> PartialEq<[&'a str; N]> for HeaderValues {
    fn eq(&self, other: &[&'a str; N]) -> bool {
        self.values.len() == N
            && self.values.iter().zip(other).all(|(v, s)| v.as_ref() == s.as_bytes())
    }
}

/// Storage for one known header: its values and, for enhanced setters, the
/// raw pre-encoded replacement for its serialized form.
#[derive(Debug, Clone, Default)]
pub(crate) struct Slot {
    pub(crate) values: Vec<Bytes>,
    pub(crate) raw: Option<Bytes>,
}

/// Above this population a full slot overwrite beats walking the set bits.
const CLEAR_CUTOFF: u32 = 12;

/// A header dictionary for direction `D`.
pub struct Headers<D: DirectionKind> {
    plan: &'static DirectionPlan,
    /// Bit `i` is set iff the header with index `i` holds a value.
    bits: u64,
    /// Snapshot of `bits` from the previous message on the connection.
    previous_bits: u64,
    content_length: Option<u64>,
    slots: Box<[Slot]>,
    unknown: Vec<(String, Vec<Bytes>)>,
    read_only: bool,
    encoding: ValueEncoding,
    _direction: PhantomData<D>,
}

impl<D: DirectionKind> Default for Headers<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DirectionKind> Headers<D> {
    pub fn new() -> Self {
        let plan = D::plan();
        Self {
            plan,
            bits: 0,
            previous_bits: 0,
            content_length: None,
            slots: vec![Slot::default(); plan.slot_count()].into_boxed_slice(),
            unknown: Vec::new(),
            read_only: false,
            encoding: ValueEncoding::default(),
            _direction: PhantomData,
        }
    }

    pub fn direction(&self) -> Direction {
        D::DIRECTION
    }

    /// The default encoding used for value sanitization.
    pub fn value_encoding(&self) -> ValueEncoding {
        self.encoding
    }

    pub fn set_value_encoding(&mut self, encoding: ValueEncoding) {
        self.encoding = encoding;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Freezes the dictionary; every later mutation fails with
    /// [`HeaderError::ReadOnly`] until it is cleared or reuse-reset.
    pub fn freeze(&mut self) {
        self.read_only = true;
    }

    fn ensure_writable(&self) -> Result<(), HeaderError> {
        if self.read_only {
            return Err(HeaderError::ReadOnly);
        }
        Ok(())
    }

    /// Number of headers visible to enumeration.
    pub fn len(&self) -> usize {
        let visible = self.bits & !self.plan.pseudo_bits();
        let mut len = visible.count_ones() as usize + self.unknown.len();
        // the request direction stores Content-Length outside the bits
        if D::DIRECTION == Direction::Request && self.content_length.is_some() {
            len += 1;
        }
        len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Case-insensitive lookup: the known set first, then the side map.
    pub fn get(&self, name: &str) -> Option<HeaderValues> {
        match self.plan.find(name.as_bytes()) {
            Some(position) => self.get_at(position),
            None => self.unknown_entry(name).map(|(_, values)| HeaderValues::from_slice(values)),
        }
    }

    /// Typed fast accessor by identifier.
    pub fn get_known(&self, known: KnownHeader) -> Option<HeaderValues> {
        self.plan.position_of(known).and_then(|position| self.get_at(position))
    }

    pub fn contains(&self, name: &str) -> bool {
        match self.plan.find(name.as_bytes()) {
            Some(position) => self.has_at(position),
            None => self.unknown_entry(name).is_some(),
        }
    }

    pub fn contains_known(&self, known: KnownHeader) -> bool {
        self.plan.position_of(known).is_some_and(|position| self.has_at(position))
    }

    /// Sets a header to a single value, replacing previous values. An empty
    /// value clears the header instead.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        if value.is_empty() {
            self.remove_inner(name);
            return Ok(());
        }
        match self.plan.find(name.as_bytes()) {
            Some(position) => self.set_at(position, value),
            None => {
                if D::VALIDATES_VALUES {
                    self.encoding.validate(value.as_bytes())?;
                }
                self.set_unknown(name, Bytes::copy_from_slice(value.as_bytes()));
                Ok(())
            }
        }
    }

    /// Typed `set` by identifier. Panics when `known` is not a member of
    /// this direction; that is a wiring bug, not an input condition.
    pub fn set_known(&mut self, known: KnownHeader, value: &str) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        let position = self.plan.position_of(known).unwrap_or_else(|| {
            panic!("{} is not a {:?} direction header", known.identifier(), D::DIRECTION)
        });
        if value.is_empty() {
            self.remove_at(position);
            return Ok(());
        }
        self.set_at(position, value)
    }

    /// As [`set`](Self::set), but fails if the header already holds a value.
    pub fn add(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        match self.plan.find(name.as_bytes()) {
            Some(position) => {
                if self.has_at(position) {
                    return Err(HeaderError::value_already_present(name));
                }
                if value.is_empty() {
                    return Ok(());
                }
                self.set_at(position, value)
            }
            None => {
                if self.unknown_entry(name).is_some() {
                    return Err(HeaderError::value_already_present(name));
                }
                if value.is_empty() {
                    return Ok(());
                }
                if D::VALIDATES_VALUES {
                    self.encoding.validate(value.as_bytes())?;
                }
                self.set_unknown(name, Bytes::copy_from_slice(value.as_bytes()));
                Ok(())
            }
        }
    }

    /// Appends a value, keeping any existing ones. An empty value is a
    /// no-op.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        if value.is_empty() {
            return Ok(());
        }
        if D::VALIDATES_VALUES {
            self.encoding.validate(value.as_bytes())?;
        }
        match self.plan.find(name.as_bytes()) {
            Some(position) => self.append_at(position, value),
            None => {
                self.append_unknown(name, Bytes::copy_from_slice(value.as_bytes()));
                Ok(())
            }
        }
    }

    fn append_at(&mut self, position: usize, value: &str) -> Result<(), HeaderError> {
        let header = *self.plan.header_at(position);
        if header.known() == KnownHeader::ContentLength {
            let parsed = parse_content_length(value.as_bytes())?;
            self.set_content_length_inner(Some(parsed));
            return Ok(());
        }
        let index = known_index(&header);
        let bit = 1u64 << index;
        let slot = &mut self.slots[index];
        if self.bits & bit == 0 {
            slot.values.clear();
            self.bits |= bit;
        }
        slot.values.push(Bytes::copy_from_slice(value.as_bytes()));
        // the raw companion no longer covers every value
        slot.raw = None;
        Ok(())
    }

    /// Removes a header; returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> Result<bool, HeaderError> {
        self.ensure_writable()?;
        Ok(self.remove_inner(name))
    }

    /// Drops every header. Also drops the read-only snapshot state, so the
    /// instance starts the next cycle from scratch.
    pub fn clear(&mut self) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        self.unknown.clear();
        self.content_length = None;
        self.previous_bits = 0;

        let bits = self.bits;
        self.bits = 0;
        if bits.count_ones() > CLEAR_CUTOFF {
            for slot in self.slots.iter_mut() {
                *slot = Slot::default();
            }
            return Ok(());
        }
        // the pinned Content-Length bit has no slot behind it
        let mut remaining = bits & slot_mask(self.slots.len());
        while remaining != 0 {
            let index = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;
            self.slots[index] = Slot::default();
        }
        Ok(())
    }

    /// Appends every visible header, in enumeration order.
    pub fn copy_to(&self, out: &mut Vec<(String, HeaderValues)>) {
        out.extend(self.iter().map(|(name, values)| (name.to_string(), values)));
    }

    /// Known headers in index order (cleared and pseudo bits skipped), the
    /// Content-Length entry, then unknown headers in insertion order.
    pub fn iter(&self) -> HeaderIter<'_> {
        HeaderIter::new(self.plan, &self.slots, &self.unknown, self.bits, self.content_length)
    }

    fn get_at(&self, position: usize) -> Option<HeaderValues> {
        let header = self.plan.header_at(position);
        if header.known() == KnownHeader::ContentLength {
            return self.content_length.map(|n| HeaderValues::single(Bytes::from(n.to_string())));
        }
        let index = known_index(header);
        if self.bits & (1 << index) == 0 {
            return None;
        }
        Some(HeaderValues::from_slice(&self.slots[index].values))
    }

    fn has_at(&self, position: usize) -> bool {
        let header = self.plan.header_at(position);
        if header.known() == KnownHeader::ContentLength {
            return self.content_length.is_some();
        }
        self.bits & (1 << known_index(header)) != 0
    }

    fn set_at(&mut self, position: usize, value: &str) -> Result<(), HeaderError> {
        let header = *self.plan.header_at(position);
        if header.known() == KnownHeader::ContentLength {
            let parsed = parse_content_length(value.as_bytes())?;
            self.set_content_length_inner(Some(parsed));
            return Ok(());
        }
        if D::VALIDATES_VALUES {
            self.encoding.validate(value.as_bytes())?;
        }
        let index = known_index(&header);
        let slot = &mut self.slots[index];
        slot.values.clear();
        slot.values.push(Bytes::copy_from_slice(value.as_bytes()));
        slot.raw = None;
        self.bits |= 1 << index;
        Ok(())
    }

    fn remove_inner(&mut self, name: &str) -> bool {
        match self.plan.find(name.as_bytes()) {
            Some(position) => self.remove_at(position),
            None => {
                let before = self.unknown.len();
                self.unknown.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
                self.unknown.len() != before
            }
        }
    }

    fn remove_at(&mut self, position: usize) -> bool {
        let header = *self.plan.header_at(position);
        if header.known() == KnownHeader::ContentLength {
            let had = self.content_length.is_some();
            self.set_content_length_inner(None);
            return had;
        }
        let index = known_index(&header);
        let bit = 1u64 << index;
        let had = self.bits & bit != 0;
        self.bits &= !bit;
        let slot = &mut self.slots[index];
        slot.values.clear();
        slot.raw = None;
        had
    }

    fn set_content_length_inner(&mut self, value: Option<u64>) {
        self.content_length = value;
        // only the response direction represents Content-Length in the bits
        if let Some(position) = self.plan.content_length_position() {
            if let Some(bit) = self.plan.header_at(position).bit() {
                if value.is_some() {
                    self.bits |= bit;
                } else {
                    self.bits &= !bit;
                }
            }
        }
    }

    fn unknown_entry(&self, name: &str) -> Option<&(String, Vec<Bytes>)> {
        self.unknown.iter().find(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    fn set_unknown(&mut self, name: &str, value: Bytes) {
        match self.unknown.iter().position(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some(i) => {
                let values = &mut self.unknown[i].1;
                values.clear();
                values.push(value);
            }
            None => self.unknown.push((name.to_string(), vec![value])),
        }
    }

    fn append_unknown(&mut self, name: &str, value: Bytes) {
        match self.unknown.iter().position(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some(i) => self.unknown[i].1.push(value),
            None => self.unknown.push((name.to_string(), vec![value])),
        }
    }

    /// Serializes every set bit: the pre-encoded `"\r\nName: "` slice and the
    /// value text, the raw replacement bytes for populated enhanced setters,
    /// and the decimal Content-Length for the pinned bit. A bit outside the
    /// direction's legal set is an implementation bug and panics.
    fn encode_fields(&self, dst: &mut BytesMut) {
        dst.reserve(self.plan.wire_blob().len());
        let mut remaining = self.bits;
        while remaining != 0 {
            let index = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;

            if index < self.slots.len() {
                let header = self.plan.header_at(index);
                assert!(
                    !header.def.is_pseudo(),
                    "pseudo header bit {index} reached the serializer"
                );
                let slot = &self.slots[index];
                if let Some(raw) = &slot.raw {
                    dst.put_slice(raw);
                    continue;
                }
                let key = self
                    .plan
                    .wire_bytes(header)
                    .expect("serialized members carry wire slices");
                for value in &slot.values {
                    dst.put_slice(key);
                    dst.put_slice(value);
                }
                continue;
            }

            // only the pinned Content-Length may sit beyond the slot range
            let position = self
                .plan
                .content_length_position()
                .filter(|&p| self.plan.header_at(p).index == Some(index as u8))
                .unwrap_or_else(|| {
                    panic!("bit {index} outside the legal {:?} set", D::DIRECTION)
                });
            let header = self.plan.header_at(position);
            let key = self.plan.wire_bytes(header).expect("content-length carries a wire slice");
            let value = self.content_length.expect("content-length bit set without a value");
            dst.put_slice(key);
            dst.put_slice(value.to_string().as_bytes());
        }

        // unregistered headers have no pre-encoded key and format inline
        for (name, values) in &self.unknown {
            for value in values {
                dst.put_slice(b"\r\n");
                dst.put_slice(name.as_bytes());
                dst.put_slice(b": ");
                dst.put_slice(value);
            }
        }
    }
}

/// Bit index of a non-Content-Length known header.
#[inline]
fn known_index(header: &gen::PlannedHeader) -> usize {
    header.index.expect("every known header except Content-Length carries a bit") as usize
}

fn slot_mask(slot_count: usize) -> u64 {
    debug_assert!(slot_count >= 1 && slot_count <= 63);
    (1u64 << slot_count) - 1
}

pub(crate) fn parse_content_length(value: &[u8]) -> Result<u64, HeaderError> {
    if value.is_empty() {
        return Err(HeaderError::invalid_content_length("empty value"));
    }
    let mut total: u64 = 0;
    for &byte in value {
        let digit = byte.wrapping_sub(b'0');
        if digit > 9 {
            return Err(HeaderError::invalid_content_length(format!(
                "unexpected byte 0x{byte:02x}"
            )));
        }
        total = total
            .checked_mul(10)
            .and_then(|t| t.checked_add(u64::from(digit)))
            .ok_or_else(|| HeaderError::invalid_content_length("value overflows u64"))?;
    }
    Ok(total)
}
