//! Unit tests for the schema module: registry, DDL parsing and graph building.

use cascade_check::schema::{
    canonical_table_name, split_statements, DdlCollector, DeleteAction, RelationGraph,
    RelationRecord, TableRegistry, TableRole,
};

fn fk(child: &str, parent: &str, action: DeleteAction) -> RelationRecord {
    RelationRecord::new(child, parent, action)
}

mod mod_tests {
    use super::*;

    #[test]
    fn test_delete_action_parsing() {
        assert_eq!(DeleteAction::from_sql("CASCADE"), DeleteAction::Cascade);
        assert_eq!(DeleteAction::from_sql("cascade"), DeleteAction::Cascade);
        assert_eq!(DeleteAction::from_sql("NO ACTION"), DeleteAction::NoAction);
        assert_eq!(DeleteAction::from_sql("set  null"), DeleteAction::SetNull);
        assert_eq!(
            DeleteAction::from_sql("SET DEFAULT"),
            DeleteAction::SetDefault
        );
        assert_eq!(DeleteAction::from_sql("RESTRICT"), DeleteAction::Restrict);
        assert_eq!(DeleteAction::from_sql(""), DeleteAction::NoAction);
        assert_eq!(DeleteAction::from_sql("bogus"), DeleteAction::NoAction);
    }

    #[test]
    fn test_only_cascade_cascades() {
        assert!(DeleteAction::Cascade.cascades());
        assert!(!DeleteAction::NoAction.cascades());
        assert!(!DeleteAction::Restrict.cascades());
        assert!(!DeleteAction::SetNull.cascades());
        assert!(!DeleteAction::SetDefault.cascades());
        assert_eq!(DeleteAction::SetNull.to_string(), "SET NULL");
    }

    #[test]
    fn test_registry_returns_same_table_per_name() {
        let mut registry = TableRegistry::new();
        let users = registry.get_or_create("users");
        let orders = registry.get_or_create("orders");

        assert_ne!(users, orders);
        assert_eq!(registry.get_or_create("users"), users);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("orders"), Some(orders));
        assert_eq!(registry.get("missing"), None);
        assert_eq!(registry.name(users), Some("users"));
        assert!(registry.table(users).unwrap().relations.is_empty());
    }

    #[test]
    fn test_registry_is_case_sensitive() {
        let mut registry = TableRegistry::new();
        let lower = registry.get_or_create("users");
        let upper = registry.get_or_create("Users");
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_canonical_table_name() {
        let tables = vec!["Customers".to_string(), "orders".to_string()];
        assert_eq!(canonical_table_name(&tables, "Customers"), Some("Customers"));
        assert_eq!(canonical_table_name(&tables, "customers"), Some("Customers"));
        assert_eq!(canonical_table_name(&tables, "ORDERS"), Some("orders"));
        assert_eq!(canonical_table_name(&tables, "invoices"), None);
    }
}

mod ddl_tests {
    use super::*;

    fn collect(sql: &str) -> (Vec<String>, Vec<RelationRecord>) {
        let mut collector = DdlCollector::new();
        for stmt in split_statements(sql) {
            collector.parse_statement(&stmt);
        }
        collector.finish()
    }

    #[test]
    fn test_table_level_foreign_keys() {
        let (tables, records) = collect(
            r#"
CREATE TABLE customers (id INTEGER PRIMARY KEY);
CREATE TABLE orders (
  id INTEGER PRIMARY KEY,
  customer_id INTEGER NOT NULL,
  CONSTRAINT fk_orders_customer FOREIGN KEY (customer_id) REFERENCES customers(id) ON DELETE CASCADE
);
"#,
        );

        assert_eq!(tables, vec!["customers", "orders"]);
        assert_eq!(
            records,
            vec![fk("orders", "customers", DeleteAction::Cascade)]
        );
    }

    #[test]
    fn test_inline_references() {
        let (_, records) = collect(
            "CREATE TABLE order_items (
               id INTEGER PRIMARY KEY,
               order_id INTEGER REFERENCES orders(id) ON DELETE SET NULL,
               product_id INTEGER REFERENCES products
             );",
        );

        assert_eq!(
            records,
            vec![
                fk("order_items", "orders", DeleteAction::SetNull),
                fk("order_items", "products", DeleteAction::NoAction),
            ]
        );
    }

    #[test]
    fn test_match_clause_before_on_delete() {
        let (_, records) = collect(
            "CREATE TABLE p (id INT PRIMARY KEY);
             CREATE TABLE c (pid INT REFERENCES p(id) MATCH FULL ON DELETE CASCADE);",
        );

        assert_eq!(records, vec![fk("c", "p", DeleteAction::Cascade)]);
    }

    #[test]
    fn test_deferrable_clause_before_on_delete() {
        let (_, records) = collect(
            "CREATE TABLE accounts (id INT PRIMARY KEY);
             CREATE TABLE ledger (
               id INT PRIMARY KEY,
               account_id INT,
               FOREIGN KEY (account_id) REFERENCES accounts(id)
                 DEFERRABLE INITIALLY DEFERRED ON DELETE CASCADE
             );
             CREATE TABLE audit (
               ledger_id INT REFERENCES ledger(id) NOT DEFERRABLE ON DELETE SET NULL
             );",
        );

        assert_eq!(
            records,
            vec![
                fk("ledger", "accounts", DeleteAction::Cascade),
                fk("audit", "ledger", DeleteAction::SetNull),
            ]
        );
    }

    #[test]
    fn test_on_update_before_on_delete() {
        let (_, records) = collect(
            "CREATE TABLE `payments` (
               `id` int NOT NULL,
               `order_id` int,
               FOREIGN KEY (`order_id`) REFERENCES `orders` (`id`) ON UPDATE CASCADE ON DELETE RESTRICT
             ) ENGINE=InnoDB;",
        );

        assert_eq!(
            records,
            vec![fk("payments", "orders", DeleteAction::Restrict)]
        );
    }

    #[test]
    fn test_postgres_alter_table() {
        let (_, records) = collect(
            r#"
CREATE TABLE public.customers (id integer NOT NULL);
CREATE TABLE public.orders (id integer NOT NULL, customer_id integer);
ALTER TABLE ONLY public.orders
    ADD CONSTRAINT orders_customer_id_fkey FOREIGN KEY (customer_id) REFERENCES public.customers(id) ON DELETE CASCADE;
"#,
        );

        assert_eq!(
            records,
            vec![fk("orders", "customers", DeleteAction::Cascade)]
        );
    }

    #[test]
    fn test_alter_table_on_unknown_table_is_ignored() {
        let (tables, records) = collect(
            "ALTER TABLE ghosts ADD FOREIGN KEY (x) REFERENCES things(id) ON DELETE CASCADE;",
        );
        assert!(tables.is_empty());
        assert!(records.is_empty());
    }

    #[test]
    fn test_referenced_names_use_declared_spelling() {
        let (_, records) = collect(
            r#"
CREATE TABLE "Customers" (id INT PRIMARY KEY);
CREATE TABLE orders (id INT, customer_id INT REFERENCES customers(id) ON DELETE CASCADE);
"#,
        );

        assert_eq!(
            records,
            vec![fk("orders", "Customers", DeleteAction::Cascade)]
        );
    }

    #[test]
    fn test_self_reference() {
        let (_, records) = collect(
            "CREATE TABLE categories (
               id INT PRIMARY KEY,
               parent_id INT,
               FOREIGN KEY (parent_id) REFERENCES categories(id) ON DELETE CASCADE
             );",
        );

        assert_eq!(records.len(), 1);
        assert!(records[0].is_self_reference());
    }

    #[test]
    fn test_non_ddl_statements_are_ignored() {
        let (tables, records) = collect(
            "SET NAMES utf8mb4;
             INSERT INTO orders VALUES (1, 'REFERENCES customers(id)');
             /* CREATE TABLE hidden (id INT); */
             CREATE INDEX idx ON orders (id);",
        );
        assert!(tables.is_empty());
        assert!(records.is_empty());
    }
}

mod graph_tests {
    use super::*;

    #[test]
    fn test_component_includes_both_directions() {
        let records = vec![
            fk("orders", "customers", DeleteAction::Cascade),
            fk("order_items", "orders", DeleteAction::Cascade),
            fk("order_items", "products", DeleteAction::NoAction),
            fk("products", "suppliers", DeleteAction::NoAction),
            fk("audit", "logins", DeleteAction::Cascade),
        ];

        let graph = RelationGraph::build(&records, "orders");

        let mut names: Vec<_> = graph.iter().map(|(_, t)| t.name.clone()).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["customers", "order_items", "orders", "products", "suppliers"]
        );
        assert!(graph.get_table_id("audit").is_none());
        assert!(graph.iter().all(|(id, _)| graph.is_collected(id)));
    }

    #[test]
    fn test_relation_roles() {
        let records = vec![
            fk("orders", "customers", DeleteAction::Cascade),
            fk("order_items", "orders", DeleteAction::Restrict),
        ];
        let graph = RelationGraph::build(&records, "orders");
        let orders = graph.table(graph.root()).unwrap();

        let references: Vec<_> = orders.references().collect();
        assert_eq!(references.len(), 1);
        assert_eq!(graph.table_name(references[0].table), Some("customers"));
        assert!(references[0].cascades);

        let dependents: Vec<_> = orders.dependents().collect();
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].owner, TableRole::Parent);
        assert_eq!(graph.table_name(dependents[0].table), Some("order_items"));
        assert!(!dependents[0].cascades);
    }

    #[test]
    fn test_cycle_builds_each_table_once() {
        let records = vec![
            fk("a", "b", DeleteAction::Cascade),
            fk("b", "c", DeleteAction::Cascade),
            fk("c", "a", DeleteAction::Cascade),
        ];
        let graph = RelationGraph::build(&records, "a");

        assert_eq!(graph.len(), 3);
        for (id, _) in graph.iter() {
            assert_eq!(graph.relations(id).len(), 2);
        }
    }

    #[test]
    fn test_duplicate_edges_produce_duplicate_relations() {
        let records = vec![
            fk("orders", "customers", DeleteAction::Cascade),
            fk("orders", "customers", DeleteAction::Cascade),
        ];
        let graph = RelationGraph::build(&records, "customers");
        assert_eq!(graph.relations(graph.root()).len(), 2);
        assert_eq!(graph.len(), 2);
    }
}
