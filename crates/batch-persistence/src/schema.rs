//! Esquema Diesel (mantenido a mano). Reemplazable con `diesel print-schema`.

diesel::table! {
    batch_job_instance (id) {
        id -> BigInt,
        job_name -> Text,
        job_key -> Text,
    }
}

diesel::table! {
    batch_job_execution (id) {
        id -> BigInt,
        job_instance_id -> BigInt,
        parameters -> Jsonb,
        status -> Text,
        exit_code -> Text,
        exit_description -> Text,
        create_time -> Timestamptz,
        start_time -> Nullable<Timestamptz>,
        end_time -> Nullable<Timestamptz>,
        last_updated -> Nullable<Timestamptz>,
        execution_context -> Jsonb,
        failures -> Jsonb,
    }
}

diesel::table! {
    batch_step_execution (id) {
        id -> BigInt,
        job_execution_id -> BigInt,
        job_instance_id -> BigInt,
        step_name -> Text,
        status -> Text,
        exit_code -> Text,
        exit_description -> Text,
        start_time -> Nullable<Timestamptz>,
        end_time -> Nullable<Timestamptz>,
        last_updated -> Nullable<Timestamptz>,
        read_count -> BigInt,
        write_count -> BigInt,
        filter_count -> BigInt,
        commit_count -> BigInt,
        rollback_count -> BigInt,
        read_skip_count -> BigInt,
        process_skip_count -> BigInt,
        write_skip_count -> BigInt,
        execution_context -> Jsonb,
        failures -> Jsonb,
    }
}

diesel::joinable!(batch_job_execution -> batch_job_instance (job_instance_id));
diesel::joinable!(batch_step_execution -> batch_job_execution (job_execution_id));

diesel::allow_tables_to_appear_in_same_query!(
    batch_job_instance,
    batch_job_execution,
    batch_step_execution,
);
