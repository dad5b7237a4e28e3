//! Integration tests for condition compilation and SELECT building.
#![allow(missing_docs)]

mod common;

use strata_orm::{Binds, Cmp, Condition, Join, Select, Value, primary_key_conditions};

#[test]
fn nested_groups_render_in_order() {
    let condition = Condition::or(vec![
        Condition::eq("field1", 1),
        Condition::ne("field2", "x"),
        Condition::and(vec![
            Condition::ge("field3", 10),
            Condition::lt("field4", 20),
        ]),
    ]);
    let mut binds = Binds::new();
    let fragment = condition.compile(&mut binds).unwrap();
    assert_eq!(
        fragment,
        "(`field1` = :field1__0 OR `field2` <> :field2__1 OR \
         (`field3` >= :field3__2 AND `field4` < :field4__3))"
    );
    assert_eq!(binds.len(), 4);
    assert_eq!(binds.get(":field3__2"), Some(&Value::Int(10)));
}

#[test]
fn primary_key_conditions_follow_key_order() {
    let schema = common::sample_schema();
    let mut data = strata_orm::ValueMap::new();
    data.insert("id".to_string(), Value::from(5));
    data.insert("pkey_2".to_string(), Value::from("a"));
    data.insert("pkey_3".to_string(), Value::from("b"));
    let condition = primary_key_conditions(&schema.primary_keys(), &data).unwrap();
    let mut binds = Binds::new();
    assert_eq!(
        condition.compile(&mut binds).unwrap(),
        "(`id` = :id__0 AND `pkey_2` = :pkey_2__1 AND `pkey_3` = :pkey_3__2)"
    );
}

#[test]
fn repeated_fields_get_unique_placeholders() {
    let condition = Condition::and(vec![
        Condition::ge("age", 18),
        Condition::lt("age", 65),
    ]);
    let mut binds = Binds::new();
    assert_eq!(
        condition.compile(&mut binds).unwrap(),
        "(`age` >= :age__0 AND `age` < :age__1)"
    );
    assert_eq!(binds.get(":age__0"), Some(&Value::Int(18)));
    assert_eq!(binds.get(":age__1"), Some(&Value::Int(65)));
}

#[test]
fn single_primary_key_compiles_bare() {
    let mut data = strata_orm::ValueMap::new();
    data.insert("id".to_string(), Value::from(7));
    let condition = primary_key_conditions(&["id".to_string()], &data).unwrap();
    assert_eq!(condition, Condition::eq("id", 7));
    let mut binds = Binds::new();
    assert_eq!(condition.compile(&mut binds).unwrap(), "`id` = :id__0");
}

#[test]
fn like_operators_place_wildcards() {
    let mut binds = Binds::new();
    let forward = Condition::forward("name", "jo").compile(&mut binds).unwrap();
    assert_eq!(forward, "`name` LIKE :name__0");
    assert_eq!(binds.get(":name__0"), Some(&Value::from("jo%")));

    let partial = Condition::partial("name", "jo").compile(&mut binds).unwrap();
    assert_eq!(partial, "`name` LIKE :name__1");
    assert_eq!(binds.get(":name__1"), Some(&Value::from("%jo%")));

    let negated = Condition::not_partial("name", "jo").compile(&mut binds).unwrap();
    assert_eq!(negated, "`name` NOT LIKE :name__2");
}

#[test]
fn in_and_between_use_sequential_placeholders() {
    let mut binds = Binds::new();
    let fragment = Condition::r#in("status", vec![Value::from("a"), Value::from("b")])
        .compile(&mut binds)
        .unwrap();
    assert_eq!(fragment, "`status` IN (:status__0, :status__1)");

    let fragment = Condition::between("id", 1, 9).compile(&mut binds).unwrap();
    assert_eq!(fragment, "`id` BETWEEN :id__2 AND :id__3");
    assert_eq!(binds.len(), 4);
}

#[test]
fn null_comparisons_take_no_binds() {
    let mut binds = Binds::new();
    assert_eq!(
        Condition::is_null("deleted_at").compile(&mut binds).unwrap(),
        "`deleted_at` IS NULL"
    );
    assert_eq!(
        Condition::is_not_null("deleted_at").compile(&mut binds).unwrap(),
        "`deleted_at` IS NOT NULL"
    );
    assert!(binds.is_empty());
}

#[test]
fn full_select_statement() {
    let statement = Select::new()
        .column("table1.*")
        .from("table1 tbl")
        .filter(Condition::eq("tbl.status", "open"))
        .order_by("tbl.id DESC")
        .limit(10)
        .offset(20)
        .for_update()
        .build()
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT `table1`.* FROM `table1` `tbl` \
         WHERE `tbl`.`status` = :tbl.status__0 \
         ORDER BY `tbl`.`id` DESC LIMIT 10 OFFSET 20 FOR UPDATE"
    );
}

#[test]
fn join_clause_renders_all_constraints() {
    let statement = Select::new()
        .column("tbl.*")
        .from("table1 tbl")
        .join(
            Join::inner("table_a tbl_a")
                .on_columns("tbl_a.tbl_id", "tbl.id")
                .on(Condition::is_null("tbl_a.deleted_at"))
                .on(Condition::eq("tbl_a.owner_id", 9)),
        )
        .build()
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT `tbl`.* FROM `table1` `tbl` \
         INNER JOIN `table_a` AS `tbl_a` ON \
         `tbl_a`.`tbl_id` = `tbl`.`id` AND \
         `tbl_a`.`deleted_at` IS NULL AND \
         `tbl_a`.`owner_id` = :tbl_a.owner_id__0"
    );
}

#[test]
fn join_comparator_symbols() {
    let statement = Select::new()
        .column("a.*")
        .from("a")
        .join(Join::left("b").on_columns_cmp("b.a_id", Cmp::Ge, "a.id"))
        .build()
        .unwrap();
    assert!(statement.sql.contains("LEFT JOIN `b` ON `b`.`a_id` >= `a`.`id`"));
}

#[test]
fn unknown_order_direction_is_dropped() {
    let statement = Select::new()
        .column("*")
        .from("table1")
        .order_by("id SIDEWAYS")
        .order_by("name desc")
        .build()
        .unwrap();
    assert!(statement.sql.ends_with("ORDER BY `id`, `name` DESC"));
}

#[test]
fn count_statement_strips_paging_and_order() {
    let statement = Select::new()
        .column("table1.*")
        .from("table1")
        .filter(Condition::gt("id", 5))
        .order_by("id DESC")
        .limit(10)
        .offset(20)
        .build_count()
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT COUNT(*) FROM `table1` WHERE `id` > :id__0"
    );
}

#[test]
fn select_list_is_mandatory() {
    assert!(Select::new().from("table1").build().is_err());
}

#[test]
fn from_target_is_mandatory() {
    assert!(Select::new().column("*").build().is_err());
}

#[test]
fn repeated_filters_merge_with_and() {
    let statement = Select::new()
        .column("*")
        .from("t")
        .filter(Condition::eq("a", 1))
        .filter(Condition::eq("b", 2))
        .filter(Condition::eq("c", 3))
        .build()
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT * FROM `t` WHERE (`a` = :a__0 AND `b` = :b__1 AND `c` = :c__2)"
    );
}

#[test]
fn raw_select_items_pass_through() {
    let statement = Select::new()
        .column("@@COUNT(DISTINCT `id`)")
        .column("status s")
        .from("t")
        .build()
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT COUNT(DISTINCT `id`), `status` AS `s` FROM `t`"
    );
}

#[test]
fn empty_in_list_is_rejected() {
    let mut binds = Binds::new();
    assert!(Condition::r#in("id", Vec::<Value>::new()).compile(&mut binds).is_err());
}
