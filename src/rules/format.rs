/*!
 * Text Layout
 * Shared writers for dimension-by-dimension dumps and separated tables
 */

use crate::core::limits::NULL_CELL;

/// Lay out row-major values following `shape`
///
/// Rank 0 and 1 produce one space-separated line. Higher ranks write the two
/// innermost dimensions as rows and end every outer block with a blank line.
pub fn plain_text(values: &[String], shape: &[usize]) -> String {
    let mut out = String::new();
    if shape.len() <= 1 {
        write_row(&mut out, values);
        return out;
    }
    write_block(&mut out, values, shape);
    out
}

fn write_block(out: &mut String, values: &[String], shape: &[usize]) {
    let (outer, inner) = match shape.split_first() {
        Some(split) => split,
        None => return,
    };
    let stride: usize = inner.iter().product();

    for index in 0..*outer {
        let start = (index * stride).min(values.len());
        let end = ((index + 1) * stride).min(values.len());
        let chunk = &values[start..end];
        if inner.len() == 1 {
            write_row(out, chunk);
        } else {
            write_block(out, chunk, inner);
            out.push('\n');
        }
    }
}

fn write_row(out: &mut String, values: &[String]) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(value);
    }
    out.push('\n');
}

/// Write a title row then one row per index of the longest column
///
/// `order` lists column indices in output order. Cells past the end of a
/// shorter column are written as the null placeholder.
pub fn table_text(
    titles: &[String],
    columns: &[Vec<String>],
    order: &[usize],
    separator: &str,
) -> String {
    let mut out = String::new();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);

    let header: Vec<&str> = order
        .iter()
        .map(|&c| titles.get(c).map(String::as_str).unwrap_or(""))
        .collect();
    out.push_str(&header.join(separator));
    out.push('\n');

    for row in 0..rows {
        let cells: Vec<&str> = order
            .iter()
            .map(|&c| {
                columns
                    .get(c)
                    .and_then(|column| column.get(row))
                    .map(String::as_str)
                    .unwrap_or(NULL_CELL)
            })
            .collect();
        out.push_str(&cells.join(separator));
        out.push('\n');
    }
    out
}

/// Resolve 1-based requested positions into an output order
///
/// `requested[c]` is the position asked for column `c`. Missing, zero,
/// out-of-range or already-taken positions leave the column to fill the
/// next free slot, in column order.
pub fn column_order(requested: &[Option<usize>]) -> Vec<usize> {
    let count = requested.len();
    let mut slots: Vec<Option<usize>> = vec![None; count];
    let mut unordered = Vec::new();

    for (column, position) in requested.iter().enumerate() {
        match position {
            Some(p) if *p >= 1 && *p <= count && slots[p - 1].is_none() => {
                slots[p - 1] = Some(column);
            }
            _ => unordered.push(column),
        }
    }

    let mut rest = unordered.into_iter();
    slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| rest.next()))
        .collect()
}
