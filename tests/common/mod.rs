//! Shared fixtures for the integration tests.

#![allow(dead_code)]

pub mod monster_generated;

use std::path::PathBuf;

pub use monster_generated::*;

use tabwire::{hash, Builder, Result, Schema};

/// Builds the reference Monster buffer.
///
/// `MyMonster` at (1, 2, 3) with 80 hp, five inventory items, a `Fred` monster in the union,
/// two `Test` structs, two strings, a nested `Nested` monster and the hashed `MyMonster` keys.
pub fn build_monster() -> Result<Vec<u8>> {
    let nested = {
        let mut fbb = Builder::new();
        let name = fbb.create_string("Nested")?;
        let mut monster = MonsterBuilder::new(&mut fbb);
        monster.add_name(name)?;
        monster.add_hp(7)?;
        let root = monster.finish()?;
        finish_monster_buffer(fbb, root)?
    };

    let mut fbb = Builder::new();
    let name = fbb.create_string("MyMonster")?;
    let inventory = fbb.create_vector(&[0u8, 1, 2, 3, 4])?;

    let fred_name = fbb.create_string("Fred")?;
    let fred = {
        let mut monster = MonsterBuilder::new(&mut fbb);
        monster.add_name(fred_name)?;
        monster.finish()?
    };

    let test4 = fbb.create_vector(&[Test::new(10, 20), Test::new(30, 40)])?;
    let strings = fbb.create_vector_of_strings(&["test1", "test2"])?;
    let nested = fbb.create_vector(&nested)?;
    let stat_id = fbb.create_string("empty")?;
    let stat = Stat::create(&mut fbb, Some(stat_id), 0, 0)?;
    let bools = fbb.create_vector(&[true, false, true])?;

    let mut monster = MonsterBuilder::new(&mut fbb);
    monster.add_pos(&Vec3::new(1.0, 2.0, 3.0, 3.0, Color::GREEN, &Test::new(5, 6)))?;
    monster.add_hp(80)?;
    monster.add_name(name)?;
    monster.add_inventory(inventory)?;
    monster.add_test(Any::MONSTER, fred)?;
    monster.add_test4(test4)?;
    monster.add_testarrayofstring(strings)?;
    monster.add_testnestedflatbuffer(nested)?;
    monster.add_testempty(stat)?;
    monster.add_testbool(true)?;
    monster.add_testhashs32_fnv1(hash::fnv1_32(b"MyMonster") as i32)?;
    monster.add_testhashu32_fnv1(hash::fnv1_32(b"MyMonster"))?;
    monster.add_testhashs64_fnv1(hash::fnv1_64(b"MyMonster") as i64)?;
    monster.add_testhashu64_fnv1(hash::fnv1_64(b"MyMonster"))?;
    monster.add_testhashs32_fnv1a(hash::fnv1a_32(b"MyMonster") as i32)?;
    monster.add_testhashu32_fnv1a(hash::fnv1a_32(b"MyMonster"))?;
    monster.add_testhashs64_fnv1a(hash::fnv1a_64(b"MyMonster") as i64)?;
    monster.add_testhashu64_fnv1a(hash::fnv1a_64(b"MyMonster"))?;
    monster.add_testarrayofbools(bools)?;
    let root = monster.finish()?;

    finish_monster_buffer(fbb, root)
}

/// Asserts every value written by [`build_monster`].
pub fn check_monster(monster: &Monster) {
    assert_eq!(monster.name(), "MyMonster");
    assert_eq!(monster.hp(), 80);
    assert_eq!(monster.mana(), 150);
    assert_eq!(monster.color(), Color::BLUE);

    let pos = monster.pos().expect("pos");
    assert_eq!((pos.x(), pos.y(), pos.z()), (1.0, 2.0, 3.0));
    assert_eq!(pos.test1(), 3.0);
    assert_eq!(pos.test2(), Color::GREEN);
    assert_eq!((pos.test3().a(), pos.test3().b()), (5, 6));

    let inventory = monster.inventory().expect("inventory");
    assert_eq!(inventory.iter().map(u32::from).sum::<u32>(), 10);
    assert_eq!(inventory.bytes(), &[0, 1, 2, 3, 4]);

    assert_eq!(monster.test_type(), Any::MONSTER);
    assert_eq!(monster.test_as_monster().expect("union").name(), "Fred");
    assert!(monster.test_as_test_simple_table_with_enum().is_none());

    let test4 = monster.test4().expect("test4");
    assert_eq!(test4.len(), 2);
    let sum: i32 = test4
        .iter()
        .map(|test| i32::from(test.a()) + i32::from(test.b()))
        .sum();
    assert_eq!(sum, 100);

    let strings: Vec<&str> = monster.testarrayofstring().expect("strings").iter().collect();
    assert_eq!(strings, ["test1", "test2"]);

    assert!(monster.testarrayoftables().is_none());
    assert!(monster.enemy().is_none());

    let nested = monster.testnestedflatbuffer_nested_root().expect("nested");
    assert_eq!(nested.name(), "Nested");
    assert_eq!(nested.hp(), 7);

    let stat = monster.testempty().expect("testempty");
    assert_eq!(stat.id(), Some("empty"));
    assert_eq!((stat.val(), stat.count()), (0, 0));

    assert!(monster.testbool());
    assert_eq!(monster.testhashu32_fnv1(), 0x2be0_3af3);
    assert_eq!(monster.testhashs32_fnv1(), 0x2be0_3af3);
    assert_eq!(monster.testhashu32_fnv1a(), 0x7c7b_f54b);
    assert_eq!(monster.testhashu64_fnv1(), 0x44a0_0602_8fb5_1333);
    assert_eq!(monster.testhashu64_fnv1a(), 0x734c_dffb_9779_2bcb);

    let bools: Vec<bool> = monster.testarrayofbools().expect("bools").iter().collect();
    assert_eq!(bools, [true, false, true]);
}

/// Path of a file under `tests/data`.
pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

/// The Monster layout metadata.
pub fn monster_schema() -> Result<Schema> {
    Schema::from_file(&data_path("monster.layout.json"))
}
