//! Typed bindings for the Monster test layout, in the shape generated bindings take.
//!
//! Slots, defaults and struct layouts mirror `tests/data/monster.layout.json`.

#![allow(dead_code)]

use std::cmp::Ordering;

use tabwire::{
    root_with_identifier, Builder, Follow, ForwardsUOffset, Push, Result, Struct, Table,
    TableFinished, TableUnfinished, Verifiable, Verifier, Vector, WIPOffset,
};

pub const MONSTER_IDENTIFIER: &str = "MONS";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(transparent)]
pub struct Color(pub i8);

impl Color {
    pub const RED: Color = Color(1);
    pub const GREEN: Color = Color(2);
    pub const BLUE: Color = Color(8);

    pub fn variant_name(self) -> Option<&'static str> {
        match self {
            Color::RED => Some("Red"),
            Color::GREEN => Some("Green"),
            Color::BLUE => Some("Blue"),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(transparent)]
pub struct Any(pub u8);

impl Any {
    pub const NONE: Any = Any(0);
    pub const MONSTER: Any = Any(1);
    pub const TEST_SIMPLE_TABLE_WITH_ENUM: Any = Any(2);
}

macro_rules! impl_struct {
    ($name:ident, $size:expr, $align:expr) => {
        impl Struct for $name {
            const SIZE: usize = $size;
            const ALIGNMENT: usize = $align;

            fn from_bytes(bytes: &[u8]) -> Self {
                let mut raw = [0u8; $size];
                raw.copy_from_slice(bytes);
                $name(raw)
            }

            fn bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl Push for $name {
            type Output = $name;
            const SIZE: usize = $size;
            const ALIGNMENT: usize = $align;

            fn push(&self, dst: &mut [u8], _written_len: usize) {
                dst.copy_from_slice(&self.0);
            }
        }

        impl<'a> Follow<'a> for $name {
            type Inner = $name;
            const INLINE_SIZE: usize = $size;

            fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
                $name::from_bytes(&buf[loc..loc + $size])
            }
        }

        impl Verifiable for $name {
            const ALIGNMENT: usize = $align;
            const TRIVIAL: bool = true;

            fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
                v.verify_struct(pos, $size, $align)
            }
        }
    };
}

/// `struct Test { a: short; b: byte; }`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Test([u8; 4]);

impl_struct!(Test, 4, 2);

impl Test {
    pub fn new(a: i16, b: i8) -> Self {
        let mut raw = [0u8; 4];
        raw[0..2].copy_from_slice(&a.to_le_bytes());
        raw[2] = b as u8;
        Test(raw)
    }

    pub fn a(&self) -> i16 {
        i16::from_le_bytes([self.0[0], self.0[1]])
    }

    pub fn b(&self) -> i8 {
        self.0[2] as i8
    }
}

/// `struct Vec3 (force_align: 16) { x, y, z: float; test1: double; test2: Color; test3: Test; }`
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Vec3([u8; 32]);

impl_struct!(Vec3, 32, 16);

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32, test1: f64, test2: Color, test3: &Test) -> Self {
        let mut raw = [0u8; 32];
        raw[0..4].copy_from_slice(&x.to_le_bytes());
        raw[4..8].copy_from_slice(&y.to_le_bytes());
        raw[8..12].copy_from_slice(&z.to_le_bytes());
        raw[16..24].copy_from_slice(&test1.to_le_bytes());
        raw[24] = test2.0 as u8;
        raw[26..30].copy_from_slice(&test3.0);
        Vec3(raw)
    }

    fn f32_at(&self, at: usize) -> f32 {
        f32::from_le_bytes(self.0[at..at + 4].try_into().unwrap())
    }

    pub fn x(&self) -> f32 {
        self.f32_at(0)
    }

    pub fn y(&self) -> f32 {
        self.f32_at(4)
    }

    pub fn z(&self) -> f32 {
        self.f32_at(8)
    }

    pub fn test1(&self) -> f64 {
        f64::from_le_bytes(self.0[16..24].try_into().unwrap())
    }

    pub fn test2(&self) -> Color {
        Color(self.0[24] as i8)
    }

    pub fn test3(&self) -> Test {
        Test::from_bytes(&self.0[26..30])
    }
}

macro_rules! impl_table {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Debug)]
        pub struct $name<'a> {
            pub table: Table<'a>,
        }

        impl<'a> Follow<'a> for $name<'a> {
            type Inner = $name<'a>;
            const INLINE_SIZE: usize = 4;

            fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
                $name {
                    table: Table::new(buf, loc),
                }
            }
        }
    };
}

impl_table!(TestSimpleTableWithEnum);

impl<'a> TestSimpleTableWithEnum<'a> {
    pub const VT_COLOR: u16 = 0;

    pub fn color(&self) -> Color {
        Color(self.table.get_or::<i8>(Self::VT_COLOR, Color::GREEN.0))
    }

    pub fn create(fbb: &mut Builder, color: Color) -> Result<WIPOffset<TableFinished>> {
        let start = fbb.start_table();
        fbb.add_field::<i8>(Self::VT_COLOR, color.0, Color::GREEN.0)?;
        fbb.end_table(start)
    }
}

impl Verifiable for TestSimpleTableWithEnum<'_> {
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        v.visit_table(pos)?
            .visit_field::<i8>("color", Self::VT_COLOR, false)?
            .finish();
        Ok(())
    }
}

impl_table!(Stat);

impl<'a> Stat<'a> {
    pub const VT_ID: u16 = 0;
    pub const VT_VAL: u16 = 1;
    pub const VT_COUNT: u16 = 2;

    pub fn id(&self) -> Option<&'a str> {
        self.table.get_str(Self::VT_ID)
    }

    pub fn val(&self) -> i64 {
        self.table.get_or::<i64>(Self::VT_VAL, 0)
    }

    pub fn count(&self) -> u16 {
        self.table.get_or::<u16>(Self::VT_COUNT, 0)
    }

    pub fn create(
        fbb: &mut Builder,
        id: Option<WIPOffset<&'static str>>,
        val: i64,
        count: u16,
    ) -> Result<WIPOffset<TableFinished>> {
        let start = fbb.start_table();
        fbb.add_field::<i64>(Self::VT_VAL, val, 0)?;
        if let Some(id) = id {
            fbb.add_offset(Self::VT_ID, id)?;
        }
        fbb.add_field::<u16>(Self::VT_COUNT, count, 0)?;
        fbb.end_table(start)
    }
}

impl Verifiable for Stat<'_> {
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        v.visit_table(pos)?
            .visit_field::<ForwardsUOffset<&str>>("id", Self::VT_ID, false)?
            .visit_field::<i64>("val", Self::VT_VAL, false)?
            .visit_field::<u16>("count", Self::VT_COUNT, false)?
            .finish();
        Ok(())
    }
}

impl_table!(Monster);

impl<'a> Monster<'a> {
    pub const VT_POS: u16 = 0;
    pub const VT_MANA: u16 = 1;
    pub const VT_HP: u16 = 2;
    pub const VT_NAME: u16 = 3;
    pub const VT_INVENTORY: u16 = 5;
    pub const VT_COLOR: u16 = 6;
    pub const VT_TEST_TYPE: u16 = 7;
    pub const VT_TEST: u16 = 8;
    pub const VT_TEST4: u16 = 9;
    pub const VT_TESTARRAYOFSTRING: u16 = 10;
    pub const VT_TESTARRAYOFTABLES: u16 = 11;
    pub const VT_ENEMY: u16 = 12;
    pub const VT_TESTNESTEDFLATBUFFER: u16 = 13;
    pub const VT_TESTEMPTY: u16 = 14;
    pub const VT_TESTBOOL: u16 = 15;
    pub const VT_TESTHASHS32_FNV1: u16 = 16;
    pub const VT_TESTHASHU32_FNV1: u16 = 17;
    pub const VT_TESTHASHS64_FNV1: u16 = 18;
    pub const VT_TESTHASHU64_FNV1: u16 = 19;
    pub const VT_TESTHASHS32_FNV1A: u16 = 20;
    pub const VT_TESTHASHU32_FNV1A: u16 = 21;
    pub const VT_TESTHASHS64_FNV1A: u16 = 22;
    pub const VT_TESTHASHU64_FNV1A: u16 = 23;
    pub const VT_TESTARRAYOFBOOLS: u16 = 24;

    pub const DEFAULT_MANA: i16 = 150;
    pub const DEFAULT_HP: i16 = 100;

    pub fn pos(&self) -> Option<Vec3> {
        self.table.get_struct::<Vec3>(Self::VT_POS)
    }

    pub fn mana(&self) -> i16 {
        self.table.get_or::<i16>(Self::VT_MANA, Self::DEFAULT_MANA)
    }

    pub fn hp(&self) -> i16 {
        self.table.get_or::<i16>(Self::VT_HP, Self::DEFAULT_HP)
    }

    pub fn name(&self) -> &'a str {
        self.table.get_str(Self::VT_NAME).unwrap()
    }

    pub fn key_compare_with_value(&self, val: &str) -> Ordering {
        self.name().cmp(val)
    }

    pub fn inventory(&self) -> Option<Vector<'a, u8>> {
        self.table.get_vector::<u8>(Self::VT_INVENTORY)
    }

    pub fn color(&self) -> Color {
        Color(self.table.get_or::<i8>(Self::VT_COLOR, Color::BLUE.0))
    }

    pub fn test_type(&self) -> Any {
        Any(self.table.get_or::<u8>(Self::VT_TEST_TYPE, 0))
    }

    pub fn test(&self) -> Option<Table<'a>> {
        self.table.get_table(Self::VT_TEST)
    }

    pub fn test_as_monster(&self) -> Option<Monster<'a>> {
        match self.table.get_union(Self::VT_TEST_TYPE, Self::VT_TEST) {
            Some((tag, table)) if Any(tag) == Any::MONSTER => Some(Monster { table }),
            _ => None,
        }
    }

    pub fn test_as_test_simple_table_with_enum(&self) -> Option<TestSimpleTableWithEnum<'a>> {
        match self.table.get_union(Self::VT_TEST_TYPE, Self::VT_TEST) {
            Some((tag, table)) if Any(tag) == Any::TEST_SIMPLE_TABLE_WITH_ENUM => {
                Some(TestSimpleTableWithEnum { table })
            }
            _ => None,
        }
    }

    pub fn test4(&self) -> Option<Vector<'a, Test>> {
        self.table.get_vector::<Test>(Self::VT_TEST4)
    }

    pub fn testarrayofstring(&self) -> Option<Vector<'a, ForwardsUOffset<&'a str>>> {
        self.table.get_vector(Self::VT_TESTARRAYOFSTRING)
    }

    pub fn testarrayoftables(&self) -> Option<Vector<'a, ForwardsUOffset<Monster<'a>>>> {
        self.table.get_vector(Self::VT_TESTARRAYOFTABLES)
    }

    pub fn enemy(&self) -> Option<Monster<'a>> {
        self.table.get::<ForwardsUOffset<Monster>>(Self::VT_ENEMY)
    }

    pub fn testnestedflatbuffer(&self) -> Option<&'a [u8]> {
        self.table
            .get::<ForwardsUOffset<&[u8]>>(Self::VT_TESTNESTEDFLATBUFFER)
    }

    pub fn testnestedflatbuffer_nested_root(&self) -> Option<Monster<'a>> {
        self.table
            .get_nested_root::<Monster>(Self::VT_TESTNESTEDFLATBUFFER)
    }

    pub fn testempty(&self) -> Option<Stat<'a>> {
        self.table.get::<ForwardsUOffset<Stat>>(Self::VT_TESTEMPTY)
    }

    pub fn testbool(&self) -> bool {
        self.table.get_or::<bool>(Self::VT_TESTBOOL, false)
    }

    pub fn testhashs32_fnv1(&self) -> i32 {
        self.table.get_or::<i32>(Self::VT_TESTHASHS32_FNV1, 0)
    }

    pub fn testhashu32_fnv1(&self) -> u32 {
        self.table.get_or::<u32>(Self::VT_TESTHASHU32_FNV1, 0)
    }

    pub fn testhashs64_fnv1(&self) -> i64 {
        self.table.get_or::<i64>(Self::VT_TESTHASHS64_FNV1, 0)
    }

    pub fn testhashu64_fnv1(&self) -> u64 {
        self.table.get_or::<u64>(Self::VT_TESTHASHU64_FNV1, 0)
    }

    pub fn testhashs32_fnv1a(&self) -> i32 {
        self.table.get_or::<i32>(Self::VT_TESTHASHS32_FNV1A, 0)
    }

    pub fn testhashu32_fnv1a(&self) -> u32 {
        self.table.get_or::<u32>(Self::VT_TESTHASHU32_FNV1A, 0)
    }

    pub fn testhashs64_fnv1a(&self) -> i64 {
        self.table.get_or::<i64>(Self::VT_TESTHASHS64_FNV1A, 0)
    }

    pub fn testhashu64_fnv1a(&self) -> u64 {
        self.table.get_or::<u64>(Self::VT_TESTHASHU64_FNV1A, 0)
    }

    pub fn testarrayofbools(&self) -> Option<Vector<'a, bool>> {
        self.table.get_vector::<bool>(Self::VT_TESTARRAYOFBOOLS)
    }
}

impl Verifiable for Monster<'_> {
    fn run_verifier(v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
        v.visit_table(pos)?
            .visit_field::<Vec3>("pos", Self::VT_POS, false)?
            .visit_field::<i16>("mana", Self::VT_MANA, false)?
            .visit_field::<i16>("hp", Self::VT_HP, false)?
            .visit_field::<ForwardsUOffset<&str>>("name", Self::VT_NAME, true)?
            .visit_field::<ForwardsUOffset<Vector<u8>>>("inventory", Self::VT_INVENTORY, false)?
            .visit_field::<i8>("color", Self::VT_COLOR, false)?
            .visit_union(
                "test_type",
                Self::VT_TEST_TYPE,
                "test",
                Self::VT_TEST,
                false,
                |tag, v, pos| match Any(tag) {
                    Any::MONSTER => Some(ForwardsUOffset::<Monster>::run_verifier(v, pos)),
                    Any::TEST_SIMPLE_TABLE_WITH_ENUM => Some(
                        ForwardsUOffset::<TestSimpleTableWithEnum>::run_verifier(v, pos),
                    ),
                    _ => None,
                },
            )?
            .visit_field::<ForwardsUOffset<Vector<Test>>>("test4", Self::VT_TEST4, false)?
            .visit_field::<ForwardsUOffset<Vector<ForwardsUOffset<&str>>>>(
                "testarrayofstring",
                Self::VT_TESTARRAYOFSTRING,
                false,
            )?
            .visit_field::<ForwardsUOffset<Vector<ForwardsUOffset<Monster>>>>(
                "testarrayoftables",
                Self::VT_TESTARRAYOFTABLES,
                false,
            )?
            .visit_field::<ForwardsUOffset<Monster>>("enemy", Self::VT_ENEMY, false)?
            .visit_field_with(
                "testnestedflatbuffer",
                Self::VT_TESTNESTEDFLATBUFFER,
                false,
                |v, pos| {
                    let target = v.follow_offset(pos)?;
                    v.verify_nested_root::<Monster>(target)
                },
            )?
            .visit_field::<ForwardsUOffset<Stat>>("testempty", Self::VT_TESTEMPTY, false)?
            .visit_field::<bool>("testbool", Self::VT_TESTBOOL, false)?
            .visit_field::<i32>("testhashs32_fnv1", Self::VT_TESTHASHS32_FNV1, false)?
            .visit_field::<u32>("testhashu32_fnv1", Self::VT_TESTHASHU32_FNV1, false)?
            .visit_field::<i64>("testhashs64_fnv1", Self::VT_TESTHASHS64_FNV1, false)?
            .visit_field::<u64>("testhashu64_fnv1", Self::VT_TESTHASHU64_FNV1, false)?
            .visit_field::<i32>("testhashs32_fnv1a", Self::VT_TESTHASHS32_FNV1A, false)?
            .visit_field::<u32>("testhashu32_fnv1a", Self::VT_TESTHASHU32_FNV1A, false)?
            .visit_field::<i64>("testhashs64_fnv1a", Self::VT_TESTHASHS64_FNV1A, false)?
            .visit_field::<u64>("testhashu64_fnv1a", Self::VT_TESTHASHU64_FNV1A, false)?
            .visit_field::<ForwardsUOffset<Vector<bool>>>(
                "testarrayofbools",
                Self::VT_TESTARRAYOFBOOLS,
                false,
            )?
            .finish();
        Ok(())
    }
}

/// Field-by-field writer for a Monster table.
pub struct MonsterBuilder<'b> {
    fbb: &'b mut Builder,
    start: WIPOffset<TableUnfinished>,
}

impl<'b> MonsterBuilder<'b> {
    pub fn new(fbb: &'b mut Builder) -> Self {
        let start = fbb.start_table();
        MonsterBuilder { fbb, start }
    }

    pub fn add_pos(&mut self, pos: &Vec3) -> Result<()> {
        self.fbb.add_struct(Monster::VT_POS, pos)
    }

    pub fn add_mana(&mut self, mana: i16) -> Result<()> {
        self.fbb
            .add_field::<i16>(Monster::VT_MANA, mana, Monster::DEFAULT_MANA)
    }

    pub fn add_hp(&mut self, hp: i16) -> Result<()> {
        self.fbb
            .add_field::<i16>(Monster::VT_HP, hp, Monster::DEFAULT_HP)
    }

    pub fn add_name(&mut self, name: WIPOffset<&'static str>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_NAME, name)
    }

    pub fn add_inventory<T>(&mut self, inventory: WIPOffset<T>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_INVENTORY, inventory)
    }

    pub fn add_color(&mut self, color: Color) -> Result<()> {
        self.fbb
            .add_field::<i8>(Monster::VT_COLOR, color.0, Color::BLUE.0)
    }

    pub fn add_test(&mut self, kind: Any, value: WIPOffset<TableFinished>) -> Result<()> {
        self.fbb.add_field::<u8>(Monster::VT_TEST_TYPE, kind.0, 0)?;
        self.fbb.add_offset(Monster::VT_TEST, value)
    }

    pub fn add_test4<T>(&mut self, test4: WIPOffset<T>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_TEST4, test4)
    }

    pub fn add_testarrayofstring<T>(&mut self, strings: WIPOffset<T>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_TESTARRAYOFSTRING, strings)
    }

    pub fn add_testarrayoftables<T>(&mut self, tables: WIPOffset<T>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_TESTARRAYOFTABLES, tables)
    }

    pub fn add_enemy(&mut self, enemy: WIPOffset<TableFinished>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_ENEMY, enemy)
    }

    pub fn add_testnestedflatbuffer<T>(&mut self, nested: WIPOffset<T>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_TESTNESTEDFLATBUFFER, nested)
    }

    pub fn add_testempty(&mut self, stat: WIPOffset<TableFinished>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_TESTEMPTY, stat)
    }

    pub fn add_testbool(&mut self, value: bool) -> Result<()> {
        self.fbb
            .add_field::<bool>(Monster::VT_TESTBOOL, value, false)
    }

    pub fn add_testhashs32_fnv1(&mut self, value: i32) -> Result<()> {
        self.fbb
            .add_field::<i32>(Monster::VT_TESTHASHS32_FNV1, value, 0)
    }

    pub fn add_testhashu32_fnv1(&mut self, value: u32) -> Result<()> {
        self.fbb
            .add_field::<u32>(Monster::VT_TESTHASHU32_FNV1, value, 0)
    }

    pub fn add_testhashs64_fnv1(&mut self, value: i64) -> Result<()> {
        self.fbb
            .add_field::<i64>(Monster::VT_TESTHASHS64_FNV1, value, 0)
    }

    pub fn add_testhashu64_fnv1(&mut self, value: u64) -> Result<()> {
        self.fbb
            .add_field::<u64>(Monster::VT_TESTHASHU64_FNV1, value, 0)
    }

    pub fn add_testhashs32_fnv1a(&mut self, value: i32) -> Result<()> {
        self.fbb
            .add_field::<i32>(Monster::VT_TESTHASHS32_FNV1A, value, 0)
    }

    pub fn add_testhashu32_fnv1a(&mut self, value: u32) -> Result<()> {
        self.fbb
            .add_field::<u32>(Monster::VT_TESTHASHU32_FNV1A, value, 0)
    }

    pub fn add_testhashs64_fnv1a(&mut self, value: i64) -> Result<()> {
        self.fbb
            .add_field::<i64>(Monster::VT_TESTHASHS64_FNV1A, value, 0)
    }

    pub fn add_testhashu64_fnv1a(&mut self, value: u64) -> Result<()> {
        self.fbb
            .add_field::<u64>(Monster::VT_TESTHASHU64_FNV1A, value, 0)
    }

    pub fn add_testarrayofbools<T>(&mut self, bools: WIPOffset<T>) -> Result<()> {
        self.fbb.add_offset(Monster::VT_TESTARRAYOFBOOLS, bools)
    }

    /// Closes the table.
    ///
    /// # Panics
    /// Panics if `name` was not added.
    pub fn finish(self) -> Result<WIPOffset<TableFinished>> {
        let monster = self.fbb.end_table(self.start)?;
        self.fbb.required(monster, Monster::VT_NAME, "name");
        Ok(monster)
    }
}

pub fn finish_monster_buffer(fbb: Builder, root: WIPOffset<TableFinished>) -> Result<Vec<u8>> {
    fbb.finish(root, Some(MONSTER_IDENTIFIER))
}

pub fn monster_buffer_has_identifier(buf: &[u8]) -> bool {
    tabwire::wire::buffer_has_identifier(buf, MONSTER_IDENTIFIER)
}

/// Verifies `buf` and returns its root Monster.
pub fn root_as_monster(buf: &[u8]) -> Result<Monster<'_>> {
    root_with_identifier::<Monster>(buf, MONSTER_IDENTIFIER)
}
