// Diesel table definitions; keep in sync with `schema_init::STATEMENTS`.

diesel::table! {
    commands (id) {
        id -> Integer,
        command -> Text,
        description -> Nullable<Text>,
        tags -> Nullable<Text>,
        created_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    subcommands (id) {
        id -> Integer,
        command_id -> Integer,
        command -> Text,
        description -> Nullable<Text>,
    }
}

diesel::joinable!(subcommands -> commands (command_id));

diesel::allow_tables_to_appear_in_same_query!(commands, subcommands);
