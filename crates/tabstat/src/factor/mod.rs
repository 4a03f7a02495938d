//! Factor codec: compact `{labels, codes}` encoding of column values.

mod codec;
mod counts;

pub use codec::{
    ColumnOptions, decode_col_values, decode_column, decode_to_strings, encode_as_factor,
    encode_col_values, infer_col_type, make_column, should_compact,
};
pub use counts::{
    BinaryDecomposeOptions, CountSort, ItemCount, ItemCountOptions, decompose_list_as_binary,
    individual_items, individual_items_with_count,
};
