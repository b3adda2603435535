// Copyright (c) 2025 Cashplan contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print output as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print output as JSON lines"),
    )
}

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .value_name("DATE")
        .help("Override 'today' (YYYY-MM-DD), defaults to the wall clock")
}

pub fn build_cli() -> Command {
    Command::new("cashplan")
        .about("Planned transactions, recurrence, plan-vs-fact tracking, and balance forecasting")
        .version(crate_version!())
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(json_flags(Command::new("list").about("List categories"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list actual transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense"])
                                .required(true),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions")
                        .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("plan")
                .about("Manage planned transactions and their recurrence rules")
                .subcommand(
                    Command::new("add")
                        .about("Create a planned transaction")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense"])
                                .required(true),
                        )
                        .arg(Arg::new("start").long("start").required(true))
                        .arg(Arg::new("end").long("end"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List planned transactions")
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Include inactive plans"),
                        ),
                ))
                .subcommand(
                    Command::new("rule")
                        .about("Set or replace a plan's recurrence rule")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64)))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser([
                                    "none", "daily", "weekly", "monthly", "yearly", "custom",
                                ])
                                .required(true),
                        )
                        .arg(
                            Arg::new("interval")
                                .long("interval")
                                .value_parser(clap::value_parser!(u32))
                                .default_value("1"),
                        )
                        .arg(
                            Arg::new("unit")
                                .long("unit")
                                .value_parser(["days", "weeks", "months", "years"])
                                .help("Interval unit, custom rules only"),
                        )
                        .arg(
                            Arg::new("weekdays")
                                .long("weekdays")
                                .value_name("0,2,4")
                                .help("Weekday set 0=Mon..6=Sun, custom weekly rules only"),
                        )
                        .arg(
                            Arg::new("workdays-only")
                                .long("workdays-only")
                                .action(ArgAction::SetTrue)
                                .help("Roll weekend dates forward to the next weekday"),
                        )
                        .arg(Arg::new("until").long("until").value_name("DATE"))
                        .arg(
                            Arg::new("count")
                                .long("count")
                                .value_parser(clap::value_parser!(u32)),
                        ),
                )
                .subcommand(
                    Command::new("enable")
                        .about("Resume occurrence generation for a plan")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64))),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Stop future occurrence generation without deleting history")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64))),
                ),
        )
        .subcommand(
            Command::new("occur")
                .about("Materialize and manage plan occurrences")
                .subcommand(
                    Command::new("ensure")
                        .about("Materialize occurrences for all active plans over a window")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List occurrences")
                        .arg(Arg::new("from").long("from"))
                        .arg(Arg::new("to").long("to"))
                        .arg(
                            Arg::new("plan")
                                .long("plan")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["pending", "executed", "skipped"]),
                        ),
                ))
                .subcommand(
                    Command::new("execute")
                        .about("Execute a pending occurrence against an actual amount/date")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64)))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(
                    Command::new("skip")
                        .about("Skip a pending occurrence")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64)))
                        .arg(Arg::new("reason").long("reason")),
                ),
        )
        .subcommand(
            Command::new("forecast")
                .about("Balance projections and cash-gap detection")
                .subcommand(
                    Command::new("balance")
                        .about("Forecast the balance at a date")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(today_arg()),
                )
                .subcommand(json_flags(
                    Command::new("period")
                        .about("Day-by-day actual/forecast series over a window")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(today_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("gaps")
                        .about("Dates with a negative forecast balance")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(today_arg()),
                )),
        )
        .subcommand(
            Command::new("lender")
                .about("Manage lenders")
                .subcommand(
                    Command::new("add")
                        .about("Add a lender")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(json_flags(Command::new("list").about("List lenders"))),
        )
        .subcommand(
            Command::new("loan")
                .about("Track loans and their scheduled payments")
                .subcommand(
                    Command::new("add")
                        .about("Record a loan")
                        .arg(Arg::new("lender").long("lender").required(true))
                        .arg(Arg::new("principal").long("principal").required(true))
                        .arg(Arg::new("opened").long("opened").required(true))
                        .arg(Arg::new("description").long("description")),
                )
                .subcommand(json_flags(Command::new("list").about("List loans")))
                .subcommand(
                    Command::new("schedule")
                        .about("Record a scheduled loan payment")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64)))
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .value_parser(["pending", "overdue", "paid"])
                                .default_value("pending"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("payments")
                        .about("List scheduled loan payments")
                        .arg(
                            Arg::new("loan")
                                .long("loan")
                                .value_parser(clap::value_parser!(i64)),
                        ),
                )),
        )
        .subcommand(
            Command::new("pending")
                .about("Track pending payments")
                .subcommand(
                    Command::new("add")
                        .about("Record a pending payment")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("date").long("date").help("Planned payment date")),
                )
                .subcommand(json_flags(Command::new("list").about("List pending payments")))
                .subcommand(
                    Command::new("done")
                        .about("Mark a pending payment as done")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64))),
                )
                .subcommand(
                    Command::new("cancel")
                        .about("Cancel a pending payment")
                        .arg(Arg::new("id").required(true).value_parser(clap::value_parser!(i64))),
                ),
        )
        .subcommand(Command::new("doctor").about("Run integrity checks on the database"))
}
