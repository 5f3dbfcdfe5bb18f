//! Console output formatter for room reports

use super::formatter::OutputFormatter;
use super::report::RoomReport;
use colored::Colorize;
use investa_domain::{
    AllocationSnapshot, ApprovalTally, ConsensusOutcome, DistributionStatus, Member,
    MemberStatus, SettlementRecord, StopTally,
};

/// Formats room reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &RoomReport) -> String {
        let summary = &report.summary;
        let mut output = String::new();

        output.push_str(&Self::header(&format!("{} ({})", summary.name, summary.code)));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n{} {} / {} {}\n{} {} / {}\n",
            "Status:".cyan().bold(),
            summary.status.as_str().yellow().bold(),
            "Funding:".cyan().bold(),
            summary.collected_amount,
            summary.goal_amount,
            summary.currency,
            "Members:".cyan().bold(),
            summary.member_count,
            summary.max_members,
        ));

        output.push_str(&Self::section_header("Members"));
        for member in &report.members {
            output.push_str(&Self::member_line(member));
        }

        if !report.approvals.is_empty() {
            output.push_str(&Self::section_header("Allocation Votes"));
            for tally in &report.approvals {
                output.push_str(&Self::approval_line(tally));
            }
        }

        if let Some(snapshot) = &report.allocation {
            output.push_str(&Self::section_header("Allocation"));
            output.push_str(&Self::allocation_block(snapshot, &summary.currency));
        }

        if !report.stops.is_empty() {
            output.push_str(&Self::section_header("Stop Votes"));
            for tally in &report.stops {
                output.push_str(&Self::stop_line(tally));
            }
        }

        if let Some(record) = &report.settlement {
            output.push_str(&Self::section_header("Settlement"));
            output.push_str(&Self::settlement_block(record, &summary.currency));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &RoomReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line summary
    pub fn format_summary(report: &RoomReport) -> String {
        let summary = &report.summary;
        format!(
            "{} {} [{}] {}/{} {} | {} members\n",
            summary.code.to_string().bold(),
            summary.name,
            summary.status.as_str().yellow(),
            summary.collected_amount,
            summary.goal_amount,
            summary.currency,
            summary.member_count,
        )
    }

    fn member_line(member: &Member) -> String {
        let status = match member.status {
            MemberStatus::Active => "active".green(),
            MemberStatus::Left => "left".dimmed(),
        };
        let creator = if member.is_creator { " (creator)" } else { "" };
        format!(
            "  {:<16} {:>12}  {}{}\n",
            member.display_name, member.contribution, status, creator
        )
    }

    fn approval_line(tally: &ApprovalTally) -> String {
        let outcome = match tally.outcome {
            ConsensusOutcome::Approved => tally.outcome.to_string().green().bold(),
            ConsensusOutcome::Rejected => tally.outcome.to_string().red().bold(),
            _ => tally.outcome.to_string().yellow(),
        };
        format!(
            "  {:<12} {} approve / {} reject / {} pending (needs {})  {}\n",
            tally.candidate_id.as_str(),
            tally.approve_count,
            tally.reject_count,
            tally.pending_count,
            tally.threshold,
            outcome
        )
    }

    fn stop_line(tally: &StopTally) -> String {
        let state = if tally.stop_approved {
            "stop approved".green().bold()
        } else {
            format!("{} more needed", tally.remaining()).yellow()
        };
        format!(
            "  {:<12} {} / {} stop votes  {}\n",
            tally.asset_id.as_str(),
            tally.stop_votes,
            tally.threshold,
            state
        )
    }

    fn allocation_block(snapshot: &AllocationSnapshot, currency: &str) -> String {
        let mut output = String::new();
        for line in &snapshot.lines {
            output.push_str(&format!(
                "  {:<12} {:<10} {:>6}%  {:>12} {}\n",
                line.candidate_id.as_str(),
                line.asset.kind(),
                line.allocation_percent,
                line.amount,
                currency
            ));
        }
        output.push_str(&format!(
            "  {} {} {}  {} {} {}\n",
            "Allocated:".dimmed(),
            snapshot.total_allocated,
            currency,
            "Unallocated:".dimmed(),
            snapshot.unallocated,
            currency
        ));
        output
    }

    fn settlement_block(record: &SettlementRecord, currency: &str) -> String {
        let mut output = String::new();
        for asset in &record.assets {
            output.push_str(&format!(
                "  {:<12} invested {:>12}  realized {:>12}\n",
                asset.candidate_id.as_str(),
                asset.invested,
                asset.realized_value
            ));
        }

        let profit = record.total_profit.to_string();
        let profit = if record.total_profit.is_sign_negative() {
            profit.red().bold()
        } else {
            profit.green().bold()
        };
        output.push_str(&format!(
            "  {} {} {}  {} {} {}  {} {} {}\n\n",
            "Invested:".dimmed(),
            record.total_invested,
            currency,
            "Uninvested:".dimmed(),
            record.uninvested_amount,
            currency,
            "Profit:".dimmed(),
            profit,
            currency
        ));

        for payout in &record.payouts {
            let mark = if payout.credited {
                "credited".green()
            } else if payout.requires_credit() {
                "pending".yellow()
            } else {
                "nothing due".dimmed()
            };
            output.push_str(&format!(
                "  {:<16} {:>12} + {:>10} = {:>12}  {}\n",
                payout.user_id.as_str(),
                payout.contribution,
                payout.profit_share,
                payout.total_return,
                mark
            ));
        }

        let distribution = match &record.distribution {
            DistributionStatus::Complete => record.distribution.as_str().green().bold(),
            DistributionStatus::Incomplete { failed } => {
                format!("incomplete ({} failed)", failed.len()).red().bold()
            }
            DistributionStatus::Pending => record.distribution.as_str().yellow(),
        };
        output.push_str(&format!("\n  {} {}\n", "Distribution:".cyan().bold(), distribution));
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &RoomReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &RoomReport) -> String {
        Self::format_json(report)
    }

    fn format_summary(&self, report: &RoomReport) -> String {
        Self::format_summary(report)
    }
}
