use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use memchr::{memchr, memchr_iter};
use memmap2::Mmap;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::{fs::File, path::Path, str};
use tracing::debug;

use crate::dataset::DatasetError;

pub const ORDER_ID: &str = "order_id";
pub const ORDER_ITEM_ID: &str = "order_item_id";
pub const PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
pub const PRODUCT_CATEGORY: &str = "product_category_name_english";
pub const PRICE: &str = "price";
pub const CUSTOMER_STATE: &str = "customer_state";
pub const FREIGHT_VALUE: &str = "freight_value";

/// Immutable, in-memory order dataset backed by a memory-mapped CSV
///
/// String columns hold `(start, end)` byte offsets into the mapped file;
/// numeric and timestamp columns are parsed eagerly at load. Columns are
/// located by header name, so the physical column order in the file does
/// not matter. `customer_state` is the one optional column: a file without
/// it still loads, and the absence surfaces as a
/// [`DatasetError::MissingColumn`] only when a report asks for it.
#[derive(Debug)]
pub struct OrderDataset {
    mmap: Mmap, // owns the CSV bytes
    order_ids: Vec<(usize, usize)>,
    order_item_ids: Vec<i64>,
    purchase_timestamps: Vec<NaiveDateTime>,
    categories: Vec<(usize, usize)>,
    prices: Vec<f64>,
    customer_states: Option<Vec<(usize, usize)>>,
    freight_values: Vec<f64>,
    row_count: usize,
}

/// Where each expected column sits in the header
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    fields: usize,
    order_id: usize,
    order_item_id: usize,
    purchase_timestamp: usize,
    product_category: usize,
    price: usize,
    customer_state: Option<usize>,
    freight_value: usize,
}

#[derive(Debug, Default)]
struct RowBatch {
    order_ids: Vec<(usize, usize)>,
    order_item_ids: Vec<i64>,
    purchase_timestamps: Vec<NaiveDateTime>,
    categories: Vec<(usize, usize)>,
    prices: Vec<f64>,
    customer_states: Vec<(usize, usize)>,
    freight_values: Vec<f64>,
}

impl OrderDataset {
    /// Loads the order CSV into memory using memory mapping
    ///
    /// Chunks the data region on newline boundaries and parses the chunks in
    /// parallel. Load is fail-fast: the first malformed row (wrong field
    /// count, unparseable number or timestamp) aborts with an error rather
    /// than silently producing wrong aggregates.
    ///
    /// # Errors
    /// Returns a [`DatasetError`] if:
    /// - The file cannot be opened or mapped
    /// - A required column is missing from the header
    /// - Any row fails to parse
    pub fn load(path: &Path) -> Result<OrderDataset, DatasetError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let buf: &[u8] = &mmap[..];

        // Parse header
        let header_end = memchr(b'\n', buf)
            .ok_or_else(|| DatasetError::Malformed("missing header line".into()))?;
        let headers: Vec<String> = buf[..header_end]
            .split(|&b| b == b',')
            .map(|s| String::from_utf8_lossy(s).trim().to_string())
            .collect();

        let locate = |name: &'static str| -> Result<usize, DatasetError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };

        let layout = ColumnLayout {
            fields: headers.len(),
            order_id: locate(ORDER_ID)?,
            order_item_id: locate(ORDER_ITEM_ID)?,
            purchase_timestamp: locate(PURCHASE_TIMESTAMP)?,
            product_category: locate(PRODUCT_CATEGORY)?,
            price: locate(PRICE)?,
            customer_state: headers.iter().position(|h| h == CUSTOMER_STATE),
            freight_value: locate(FREIGHT_VALUE)?,
        };

        let data_start = header_end + 1;
        if data_start >= buf.len() {
            return Err(DatasetError::Malformed("no data rows".into()));
        }
        let data = &buf[data_start..];

        // Parse chunks in parallel, each batch carrying absolute mmap offsets
        let chunks = Self::find_chunk_boundaries(data, rayon::current_num_threads());
        let batches: Vec<RowBatch> = chunks
            .par_iter()
            .map(|&(start, end)| parse_chunk(&data[start..end], &layout, data_start + start))
            .collect::<Result<_, _>>()?;

        let mut merged = RowBatch::default();
        for mut batch in batches {
            merged.order_ids.append(&mut batch.order_ids);
            merged.order_item_ids.append(&mut batch.order_item_ids);
            merged
                .purchase_timestamps
                .append(&mut batch.purchase_timestamps);
            merged.categories.append(&mut batch.categories);
            merged.prices.append(&mut batch.prices);
            merged.customer_states.append(&mut batch.customer_states);
            merged.freight_values.append(&mut batch.freight_values);
        }

        let row_count = merged.order_ids.len();
        debug!(rows = row_count, "parsed order data");

        Ok(OrderDataset {
            mmap,
            order_ids: merged.order_ids,
            order_item_ids: merged.order_item_ids,
            purchase_timestamps: merged.purchase_timestamps,
            categories: merged.categories,
            prices: merged.prices,
            customer_states: layout.customer_state.map(|_| merged.customer_states),
            freight_values: merged.freight_values,
            row_count,
        })
    }

    fn find_chunk_boundaries(data: &[u8], num_chunks: usize) -> Vec<(usize, usize)> {
        if data.is_empty() {
            return vec![];
        }

        let chunk_size = data.len() / num_chunks;
        let mut boundaries = Vec::with_capacity(num_chunks);
        let mut start = 0;

        for i in 0..num_chunks - 1 {
            let mut end = (i + 1) * chunk_size;

            // Advance to the next newline so rows never straddle chunks
            while end < data.len() && data[end] != b'\n' {
                end += 1;
            }

            if end < data.len() {
                end += 1; // Include the newline
            }

            if start < end {
                boundaries.push((start, end));
            }
            start = end;
        }

        // Last chunk gets everything remaining
        if start < data.len() {
            boundaries.push((start, data.len()));
        }

        boundaries
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn has_customer_state(&self) -> bool {
        self.customer_states.is_some()
    }

    pub fn order_item_ids(&self) -> &[i64] {
        &self.order_item_ids
    }

    pub fn purchase_timestamps(&self) -> &[NaiveDateTime] {
        &self.purchase_timestamps
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn freight_values(&self) -> &[f64] {
        &self.freight_values
    }

    pub fn order_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order_ids.iter().map(move |&(s, e)| self.resolve(s, e))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories
            .iter()
            .map(move |&(s, e)| self.resolve(s, e))
    }

    /// Iterator over the `customer_state` column
    ///
    /// # Errors
    /// [`DatasetError::MissingColumn`] if the loaded file had no
    /// `customer_state` column.
    pub fn customer_states(&self) -> Result<impl Iterator<Item = &str> + '_, DatasetError> {
        let spans = self
            .customer_states
            .as_ref()
            .ok_or_else(|| DatasetError::MissingColumn(CUSTOMER_STATE.to_string()))?;
        Ok(spans.iter().map(move |&(s, e)| self.resolve(s, e)))
    }

    // Resolve string offsets against the mmap
    fn resolve(&self, start: usize, end: usize) -> &str {
        str::from_utf8(&self.mmap[start..end]).unwrap_or("")
    }
}

fn parse_chunk(
    chunk: &[u8],
    layout: &ColumnLayout,
    chunk_offset: usize, // Absolute offset of this chunk in the file
) -> Result<RowBatch, DatasetError> {
    let mut batch = RowBatch::default();
    let mut fields: Vec<&[u8]> = Vec::with_capacity(layout.fields);

    let mut start = 0;
    for newline_pos in memchr_iter(b'\n', chunk) {
        let line = &chunk[start..newline_pos];
        start = newline_pos + 1;
        parse_line(line, chunk, layout, chunk_offset, &mut fields, &mut batch)?;
    }

    // Final line without a trailing newline
    if start < chunk.len() {
        let line = &chunk[start..];
        parse_line(line, chunk, layout, chunk_offset, &mut fields, &mut batch)?;
    }

    Ok(batch)
}

fn parse_line<'a>(
    mut line: &'a [u8],
    chunk: &'a [u8],
    layout: &ColumnLayout,
    chunk_offset: usize,
    fields: &mut Vec<&'a [u8]>,
    batch: &mut RowBatch,
) -> Result<(), DatasetError> {
    if let [rest @ .., b'\r'] = line {
        line = rest;
    }
    if line.is_empty() {
        return Ok(());
    }

    // Absolute line position in the file
    let line_offset = line.as_ptr() as usize - chunk.as_ptr() as usize;
    let absolute = chunk_offset + line_offset;

    // Split line into fields
    fields.clear();
    let mut field_start = 0;
    for comma_pos in memchr_iter(b',', line) {
        fields.push(&line[field_start..comma_pos]);
        field_start = comma_pos + 1;
    }
    fields.push(&line[field_start..]);

    if fields.len() != layout.fields {
        return Err(DatasetError::Malformed(format!(
            "expected {} fields, got {}",
            layout.fields,
            fields.len()
        )));
    }

    // Absolute mmap offsets for string fields
    let span = |field: &[u8]| {
        let off = field.as_ptr() as usize - line.as_ptr() as usize;
        (absolute + off, absolute + off + field.len())
    };

    batch.order_ids.push(span(fields[layout.order_id]));

    let item_id = fields[layout.order_item_id];
    batch.order_item_ids.push(
        atoi_simd::parse::<i64>(item_id).map_err(|_| field_error(ORDER_ITEM_ID, item_id))?,
    );

    let ts = fields[layout.purchase_timestamp];
    batch.purchase_timestamps.push(
        parse_timestamp(str::from_utf8(ts)?).ok_or_else(|| field_error(PURCHASE_TIMESTAMP, ts))?,
    );

    batch.categories.push(span(fields[layout.product_category]));

    let price = fields[layout.price];
    batch
        .prices
        .push(fast_float::parse::<f64, _>(price).map_err(|_| field_error(PRICE, price))?);

    if let Some(idx) = layout.customer_state {
        batch.customer_states.push(span(fields[idx]));
    }

    let freight = fields[layout.freight_value];
    batch
        .freight_values
        .push(fast_float::parse::<f64, _>(freight).map_err(|_| field_error(FREIGHT_VALUE, freight))?);

    Ok(())
}

fn field_error(column: &'static str, value: &[u8]) -> DatasetError {
    DatasetError::Field {
        column,
        value: String::from_utf8_lossy(value).into_owned(),
    }
}

// Accepts "2017-10-02 10:56:33" and bare dates
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
