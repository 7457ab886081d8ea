pub mod shared {
    pub mod core {
        pub mod primitives;
    }
}

pub mod modules {
    pub mod projects {
        pub mod core {
            pub mod aggregation;
            pub mod charge;
            pub mod filters;
            pub mod ports;
            pub mod project;
            pub mod reporting;
            pub mod validation;
        }
        pub mod use_cases {
            pub mod errors;
            pub mod manage_projects {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod cli;
                    pub mod graphql;
                    pub mod http;
                }
            }
            pub mod manage_charges {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod cli;
                    pub mod graphql;
                    pub mod http;
                }
            }
            pub mod list_records {
                pub mod handler;
                pub mod inbound {
                    pub mod cli;
                    pub mod graphql;
                    pub mod http;
                }
                pub mod projection;
            }
            pub mod monthly_summary {
                pub mod handler;
                pub mod inbound {
                    pub mod cli;
                    pub mod graphql;
                    pub mod http;
                }
            }
            pub mod dashboard {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
        pub mod adapters {
            pub mod outbound {
                pub mod in_memory;
                pub mod sqlite;
            }
        }
    }
}

pub mod shell;
