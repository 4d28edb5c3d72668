//! Растущий буфер записи энкодера.
//!
//! Буфер принадлежит одному энкодеру и переиспользуется между вызовами
//! `encode`: сбрасывается только курсор, память не освобождается. Ёмкость
//! только растёт (удвоением), и каждая запись сначала проверяет ёмкость.

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;
use zpack_error::{EncodeError, ZpackResult};

/// Наибольшая ёмкость, которую может иметь аллокация `Vec<u8>`.
const MAX_CAPACITY: usize = isize::MAX as usize;

#[derive(Debug)]
pub struct GrowableBuffer {
    data: Vec<u8>,
    offset: usize,
}

impl GrowableBuffer {
    /// Создаёт буфер с начальной ёмкостью `capacity` байт.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            offset: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Позиция следующего свободного байта.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Сбрасывает курсор записи. Память остаётся за буфером.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Записанные с последнего `reset` байты.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.offset]
    }

    /// Гарантирует, что следующие `len` байт поместятся от текущего курсора.
    pub fn ensure_capacity(
        &mut self,
        len: usize,
    ) -> ZpackResult<()> {
        let min_capacity = self
            .offset
            .checked_add(len)
            .filter(|&n| n <= MAX_CAPACITY)
            .ok_or(EncodeError::OutOfMemory {
                requested: None,
                capacity: self.capacity(),
            })?;

        if min_capacity > self.capacity() {
            self.grow(min_capacity)?;
        }
        Ok(())
    }

    fn grow(
        &mut self,
        min_capacity: usize,
    ) -> ZpackResult<()> {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity
            .checked_mul(2)
            .filter(|&n| n <= MAX_CAPACITY)
            .map_or(min_capacity, |doubled| doubled.max(min_capacity));

        let mut grown = Vec::new();
        grown
            .try_reserve_exact(new_capacity)
            .map_err(|_| EncodeError::OutOfMemory {
                requested: Some(new_capacity),
                capacity: old_capacity,
            })?;
        grown.extend_from_slice(&self.data[..self.offset]);
        grown.resize(new_capacity, 0);
        self.data = grown;

        debug!(
            old_capacity,
            new_capacity,
            offset = self.offset,
            "Encoder buffer grown"
        );
        Ok(())
    }

    pub fn write_u8(
        &mut self,
        byte: u8,
    ) -> ZpackResult<()> {
        self.ensure_capacity(1)?;
        self.data[self.offset] = byte;
        self.offset += 1;
        Ok(())
    }

    pub fn write_u32_le(
        &mut self,
        n: u32,
    ) -> ZpackResult<()> {
        self.ensure_capacity(4)?;
        LittleEndian::write_u32(&mut self.data[self.offset..self.offset + 4], n);
        self.offset += 4;
        Ok(())
    }

    pub fn write_i32_le(
        &mut self,
        n: i32,
    ) -> ZpackResult<()> {
        self.ensure_capacity(4)?;
        LittleEndian::write_i32(&mut self.data[self.offset..self.offset + 4], n);
        self.offset += 4;
        Ok(())
    }

    pub fn write_f64_le(
        &mut self,
        n: f64,
    ) -> ZpackResult<()> {
        self.ensure_capacity(8)?;
        LittleEndian::write_f64(&mut self.data[self.offset..self.offset + 8], n);
        self.offset += 8;
        Ok(())
    }

    pub fn write_i64_le(
        &mut self,
        n: i64,
    ) -> ZpackResult<()> {
        self.ensure_capacity(8)?;
        LittleEndian::write_i64(&mut self.data[self.offset..self.offset + 8], n);
        self.offset += 8;
        Ok(())
    }

    pub fn write_u64_le(
        &mut self,
        n: u64,
    ) -> ZpackResult<()> {
        self.ensure_capacity(8)?;
        LittleEndian::write_u64(&mut self.data[self.offset..self.offset + 8], n);
        self.offset += 8;
        Ok(())
    }

    /// Копирует байты как есть. Курсор сдвигается на длину в байтах, не в
    /// символах.
    pub fn write_bytes(
        &mut self,
        bytes: &[u8],
    ) -> ZpackResult<()> {
        self.ensure_capacity(bytes.len())?;
        self.data[self.offset..self.offset + bytes.len()].copy_from_slice(bytes);
        self.offset += bytes.len();
        Ok(())
    }
}
