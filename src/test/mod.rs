//! Buffers and table types shared by the unit tests.

use crate::{
    verifier::{Verifiable, Verifier},
    view::{Follow, ForwardsUOffset, Table},
    Builder, Result,
};

/// Builds a table with `x: i32` in slot 0 and `y: i32` in slot 1, both defaulting to 0.
pub fn point_buffer(x: i32, y: i32, ident: Option<&str>) -> Vec<u8> {
    let mut builder = Builder::new();
    let start = builder.start_table();
    builder.add_field::<i32>(0, x, 0).unwrap();
    builder.add_field::<i32>(1, y, 0).unwrap();
    let root = builder.end_table(start).unwrap();
    builder.finish(root, ident).unwrap()
}

/// Verifies the table written by [`point_buffer`].
pub fn verify_point(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
    v.visit_table(pos)?
        .visit_field::<i32>("x", 0, false)?
        .visit_field::<i32>("y", 1, false)?
        .finish();
    Ok(())
}

/// Builds `n` tables, each linking to the next one through slot 0.
pub fn nested_tables(n: usize) -> Vec<u8> {
    let mut builder = Builder::new();
    let mut inner = None;
    for _ in 0..n {
        let start = builder.start_table();
        if let Some(next) = inner {
            builder.add_offset(0, next).unwrap();
        }
        inner = Some(builder.end_table(start).unwrap());
    }
    builder.finish(inner.unwrap(), None).unwrap()
}

/// A table whose slot 0 optionally holds another `Chain`.
#[derive(Debug, Clone, Copy)]
pub struct Chain<'a>(pub Table<'a>);

impl<'a> Chain<'a> {
    pub fn next(&self) -> Option<Chain<'a>> {
        self.0.get::<ForwardsUOffset<Chain>>(0)
    }
}

impl<'a> Follow<'a> for Chain<'a> {
    type Inner = Chain<'a>;

    const INLINE_SIZE: usize = <Table<'a> as Follow<'a>>::INLINE_SIZE;

    fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
        Chain(Table::new(buf, loc))
    }
}

impl Verifiable for Chain<'_> {
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<Chain>>("next", 0, false)?
            .finish();
        Ok(())
    }
}

#[test]
fn chain_walks_every_table() {
    let data = nested_tables(4);
    let mut current = Some(crate::view::root_unchecked::<Chain>(&data));
    let mut count = 0;
    while let Some(chain) = current {
        count += 1;
        current = chain.next();
    }
    assert_eq!(count, 4);
}
