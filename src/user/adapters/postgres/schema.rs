//! Diesel schema for user persistence.

diesel::table! {
    /// Users who signed in through OAuth.
    users (id) {
        /// Internal user identifier.
        id -> Uuid,
        /// Identity provider account id.
        #[max_length = 64]
        external_id -> Varchar,
        /// Display username.
        #[max_length = 255]
        username -> Varchar,
        /// E-mail address, when shared.
        #[max_length = 320]
        email -> Nullable<Varchar>,
        /// Avatar image URL.
        avatar_url -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
