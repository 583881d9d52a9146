//! Disbursement voucher layout.
//!
//! The voucher is laid out as one vertical flow of fixed blocks: header,
//! title, header grid, particulars, certification, received payment,
//! accounting entries and the final signature block. Only the accounting
//! entries block checks the remaining page space before it is drawn; the
//! blocks above it may run past the bottom margin of the first page.

use rust_decimal::Decimal;
use serde::Serialize;

use super::amount_words;
use super::fonts::{fit_to_width, text_width, FontWeight};
use super::format::{format_currency, format_percent, wrap_text};
use super::page::{
    Align, DrawOp, LogoSlot, Page, CONTENT_BOTTOM, CONTENT_LEFT, CONTENT_RIGHT, CONTENT_TOP,
    CONTENT_WIDTH, PAGE_WIDTH,
};
use crate::config::OrganizationProfile;
use crate::voucher::model::{AccountingEntry, DisbursementVoucher, VoucherTotals};

const TITLE: &str = "DISBURSEMENT VOUCHER";
const NOT_AVAILABLE: &str = "N/A";

const BODY_SIZE: f32 = 9.0;
const SMALL_SIZE: f32 = 8.0;
const HEADER_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 14.0;
const LINE_HEIGHT: f32 = 12.0;
const PADDING: f32 = 6.0;
const RULE: f32 = 0.75;
const TOTAL_FILL_GRAY: f32 = 0.85;

const LOGO_SIZE: f32 = 60.0;
const HEADER_HEIGHT: f32 = 72.0;
const HEADER_LINE_HEIGHT: f32 = 13.0;
const TITLE_HEIGHT: f32 = 28.0;
const GRID_HEIGHT: f32 = 54.0;

const PARTICULARS_BASE: f32 = 28.0;
const PARTICULARS_TRAILER: f32 = 44.0;
const DESCRIPTION_X: f32 = CONTENT_LEFT + 68.0;
const DESCRIPTION_CHARS_PER_LINE: usize = 56;
const WORDS_CHARS_PER_LINE: usize = 46;
const AMOUNT_COLUMN_X: f32 = CONTENT_RIGHT - 120.0;

const CERTIFICATION_HEIGHT: f32 = 96.0;
const CAPTION_CHARS_PER_LINE: usize = 34;
const CERTIFICATION_CAPTIONS: [&str; 3] = [
    "A. Certified: Existence of available appropriation",
    "B. Certified: Funds available in the amount stated",
    "C. Certified: Supporting documents complete, expenses valid and legal",
];

const RECEIVED_HEIGHT: f32 = 84.0;

const ACCOUNTING_BASE: f32 = 34.0;
const ACCOUNTING_ROW_HEIGHT: f32 = 14.0;
const ACCOUNT_LINE_HEIGHT: f32 = 10.0;
const ACCOUNTING_MIN_ROWS: usize = 5;
const ACCOUNTING_MIN_HEIGHT: f32 = 120.0;
const ACCOUNT_CHARS_PER_LINE: usize = 40;
/// Left edges of account / code / debit / credit, then the right edge.
const ACCOUNTING_COLUMNS: [f32; 5] = [CONTENT_LEFT, 276.0, 348.0, 444.0, CONTENT_RIGHT];

const SIGNATURE_HEIGHT: f32 = 72.0;

/// Output of a layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedVoucher {
    pub pages: Vec<Page>,
    pub totals: VoucherTotals,
    /// Rows drawn in the accounting table, padding included.
    pub accounting_rows: usize,
}

/// Lays a [`DisbursementVoucher`] out onto fixed-size pages.
#[derive(Debug, Clone, Default)]
pub struct VoucherLayoutEngine {
    profile: OrganizationProfile,
}

impl VoucherLayoutEngine {
    pub fn new(profile: OrganizationProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &OrganizationProfile {
        &self.profile
    }

    pub fn render(&self, voucher: &DisbursementVoucher) -> RenderedVoucher {
        let totals = voucher.totals();
        let mut flow = Flow::new();

        self.header(&mut flow);
        title(&mut flow);
        self.header_grid(&mut flow, voucher);
        particulars(&mut flow, voucher, &totals);
        certification(&mut flow, voucher);
        received_payment(&mut flow, voucher);
        let accounting_rows = accounting_entries(&mut flow, &voucher.accounting_entries);
        signatures(&mut flow, voucher);

        RenderedVoucher {
            pages: flow.finish(),
            totals,
            accounting_rows,
        }
    }

    fn header(&self, flow: &mut Flow) {
        let top = flow.y;
        flow.push(DrawOp::Image {
            slot: LogoSlot::Left,
            x: CONTENT_LEFT,
            y: top,
            width: LOGO_SIZE,
            height: LOGO_SIZE,
        });
        flow.push(DrawOp::Image {
            slot: LogoSlot::Right,
            x: CONTENT_RIGHT - LOGO_SIZE,
            y: top,
            width: LOGO_SIZE,
            height: LOGO_SIZE,
        });

        let center = PAGE_WIDTH / 2.0;
        for (i, line) in self.profile.header_lines().iter().enumerate() {
            // The barangay name is the emphasized line.
            let (size, weight) = if i == 3 {
                (HEADER_SIZE, FontWeight::Bold)
            } else {
                (BODY_SIZE, FontWeight::Regular)
            };
            flow.text(
                center,
                top + 12.0 + HEADER_LINE_HEIGHT * i as f32,
                size,
                weight,
                Align::Center,
                line,
            );
        }
        flow.y += HEADER_HEIGHT;
    }

    fn header_grid(&self, flow: &mut Flow, voucher: &DisbursementVoucher) {
        let top = flow.y;
        let column_width = CONTENT_WIDTH / 3.0;
        flow.outline(CONTENT_LEFT, top, CONTENT_WIDTH, GRID_HEIGHT);
        for i in 1..3 {
            let x = CONTENT_LEFT + column_width * i as f32;
            flow.line(x, top, x, top + GRID_HEIGHT);
        }

        let payee = voucher.payee.to_uppercase();
        let columns: [[(&str, &str); 3]; 3] = [
            [
                ("Barangay:", self.profile.barangay.as_str()),
                ("Payee:", payee.as_str()),
                ("Address:", opt(&voucher.payee_address)),
            ],
            [
                ("City:", self.profile.city.as_str()),
                ("Province:", self.profile.province.as_str()),
                ("TIN:", opt(&voucher.tax_identification_number)),
            ],
            [
                ("No.:", voucher.voucher_number.as_str()),
                ("Date:", opt(&voucher.voucher_date)),
                ("Fund:", voucher.fund_source.as_str()),
            ],
        ];

        for (c, cells) in columns.iter().enumerate() {
            let x = CONTENT_LEFT + column_width * c as f32;
            for (r, (label, value)) in cells.iter().enumerate() {
                let baseline = top + 15.0 + 16.0 * r as f32;
                flow.labeled(x + PADDING, baseline, column_width - 2.0 * PADDING, label, value);
            }
        }
        flow.y += GRID_HEIGHT;
    }
}

fn title(flow: &mut Flow) {
    flow.text(
        PAGE_WIDTH / 2.0,
        flow.y + 18.0,
        TITLE_SIZE,
        FontWeight::Bold,
        Align::Center,
        TITLE,
    );
    flow.y += TITLE_HEIGHT;
}

fn particulars(flow: &mut Flow, voucher: &DisbursementVoucher, totals: &VoucherTotals) {
    let descriptions: Vec<Vec<String>> = voucher
        .particulars
        .iter()
        .map(|p| wrap_text(&p.description, DESCRIPTION_CHARS_PER_LINE))
        .collect();
    let body_lines: usize = voucher
        .particulars
        .iter()
        .zip(&descriptions)
        .map(|(p, lines)| lines.len() + usize::from(p.tax_rate_percent > Decimal::ZERO))
        .sum();

    let words = wrap_text(
        &amount_words::spell(totals.net_amount),
        WORDS_CHARS_PER_LINE,
    );
    let body_height = PARTICULARS_BASE + LINE_HEIGHT * body_lines as f32;
    let height = body_height + PARTICULARS_TRAILER + LINE_HEIGHT * words.len() as f32;

    let top = flow.y;
    flow.outline(CONTENT_LEFT, top, CONTENT_WIDTH, height);
    flow.line(AMOUNT_COLUMN_X, top, AMOUNT_COLUMN_X, top + body_height);
    flow.line(CONTENT_LEFT, top + 20.0, CONTENT_RIGHT, top + 20.0);
    flow.text(
        (CONTENT_LEFT + AMOUNT_COLUMN_X) / 2.0,
        top + 14.0,
        BODY_SIZE,
        FontWeight::Bold,
        Align::Center,
        "PARTICULARS",
    );
    flow.text(
        (AMOUNT_COLUMN_X + CONTENT_RIGHT) / 2.0,
        top + 14.0,
        BODY_SIZE,
        FontWeight::Bold,
        Align::Center,
        "AMOUNT",
    );

    let amount_x = CONTENT_RIGHT - PADDING;
    let mut y = top + PARTICULARS_BASE;
    for (particular, lines) in voucher.particulars.iter().zip(&descriptions) {
        flow.text(
            CONTENT_LEFT + PADDING,
            y + 9.0,
            BODY_SIZE,
            FontWeight::Bold,
            Align::Left,
            "For Payment:",
        );
        flow.text(
            amount_x,
            y + 9.0,
            BODY_SIZE,
            FontWeight::Regular,
            Align::Right,
            &format_currency(particular.amount),
        );
        for line in lines {
            flow.text(
                DESCRIPTION_X,
                y + 9.0,
                BODY_SIZE,
                FontWeight::Regular,
                Align::Left,
                line,
            );
            y += LINE_HEIGHT;
        }

        if particular.tax_rate_percent > Decimal::ZERO {
            flow.text(
                DESCRIPTION_X,
                y + 9.0,
                BODY_SIZE,
                FontWeight::Regular,
                Align::Left,
                &format!(
                    "With Holding Tax: {}",
                    format_percent(particular.tax_rate_percent)
                ),
            );
            flow.text(
                amount_x,
                y + 9.0,
                BODY_SIZE,
                FontWeight::Regular,
                Align::Right,
                &format_currency(-particular.withheld_tax()),
            );
            y += LINE_HEIGHT;
        }
    }

    let trailer_top = top + body_height;
    flow.line(CONTENT_LEFT, trailer_top, CONTENT_RIGHT, trailer_top);
    flow.text(
        CONTENT_LEFT + PADDING,
        trailer_top + 14.0,
        BODY_SIZE,
        FontWeight::Bold,
        Align::Left,
        "Amount in Words:",
    );
    let mut words_y = trailer_top + 14.0;
    for line in &words {
        words_y += LINE_HEIGHT;
        flow.text(
            CONTENT_LEFT + 18.0,
            words_y,
            BODY_SIZE,
            FontWeight::Bold,
            Align::Left,
            line,
        );
    }

    let box_top = words_y + 6.0;
    let box_width = CONTENT_RIGHT - AMOUNT_COLUMN_X;
    flow.push(DrawOp::Rect {
        x: AMOUNT_COLUMN_X,
        y: box_top,
        width: box_width,
        height: 18.0,
        fill_gray: Some(TOTAL_FILL_GRAY),
        stroke: true,
    });
    flow.text(
        AMOUNT_COLUMN_X - PADDING,
        box_top + 12.0,
        BODY_SIZE,
        FontWeight::Bold,
        Align::Right,
        "TOTAL",
    );
    flow.text(
        amount_x,
        box_top + 12.0,
        BODY_SIZE,
        FontWeight::Bold,
        Align::Right,
        &format_currency(totals.net_amount),
    );

    flow.y += height;
}

fn certification(flow: &mut Flow, voucher: &DisbursementVoucher) {
    let top = flow.y;
    let column_width = CONTENT_WIDTH / 3.0;
    flow.outline(CONTENT_LEFT, top, CONTENT_WIDTH, CERTIFICATION_HEIGHT);

    for (i, (slot, caption)) in voucher
        .signatories
        .slots()
        .into_iter()
        .zip(CERTIFICATION_CAPTIONS)
        .enumerate()
    {
        let x = CONTENT_LEFT + column_width * i as f32;
        if i > 0 {
            flow.line(x, top, x, top + CERTIFICATION_HEIGHT);
        }

        for (k, line) in wrap_text(caption, CAPTION_CHARS_PER_LINE).iter().enumerate() {
            flow.text(
                x + PADDING,
                top + 12.0 + 10.0 * k as f32,
                SMALL_SIZE,
                FontWeight::Regular,
                Align::Left,
                line,
            );
        }

        let signatory = slot.filter(|s| s.has_name());
        let name = signatory
            .map(|s| s.name.to_uppercase())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        signature_line(
            flow,
            x,
            column_width,
            top + 66.0,
            &name,
            signatory.map(|s| s.position.as_str()).unwrap_or(""),
        );
    }

    flow.y += CERTIFICATION_HEIGHT;
}

fn received_payment(flow: &mut Flow, voucher: &DisbursementVoucher) {
    let top = flow.y;
    flow.outline(CONTENT_LEFT, top, CONTENT_WIDTH, RECEIVED_HEIGHT);
    flow.text(
        CONTENT_LEFT + PADDING,
        top + 14.0,
        BODY_SIZE,
        FontWeight::Bold,
        Align::Left,
        "RECEIVED PAYMENT",
    );

    let rows = [
        ("Check No.:", opt(&voucher.check_number)),
        ("Bank Name:", opt(&voucher.bank_name)),
        ("OR No.:", opt(&voucher.official_receipt_number)),
        ("Date:", opt(&voucher.payment_date)),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        flow.labeled(
            CONTENT_LEFT + PADDING,
            top + 30.0 + 14.0 * i as f32,
            220.0,
            label,
            value,
        );
    }

    let line_left = CONTENT_LEFT + 258.0;
    let line_right = CONTENT_RIGHT - 12.0;
    flow.line(line_left, top + 58.0, line_right, top + 58.0);
    flow.text(
        (line_left + line_right) / 2.0,
        top + 70.0,
        SMALL_SIZE,
        FontWeight::Regular,
        Align::Center,
        "Signature over Printed Name",
    );

    flow.y += RECEIVED_HEIGHT;
}

struct AccountRow {
    account: Vec<String>,
    code: String,
    debit: String,
    credit: String,
}

impl AccountRow {
    fn blank() -> Self {
        Self {
            account: vec![String::new()],
            code: String::new(),
            debit: String::new(),
            credit: String::new(),
        }
    }

    fn from_entry(entry: &AccountingEntry) -> Self {
        Self {
            account: wrap_text(&entry.account, ACCOUNT_CHARS_PER_LINE),
            code: entry.account_code.clone(),
            debit: amount_or_blank(entry.debit),
            credit: amount_or_blank(entry.credit),
        }
    }

    fn height(&self) -> f32 {
        ACCOUNTING_ROW_HEIGHT + ACCOUNT_LINE_HEIGHT * (self.account.len().max(1) - 1) as f32
    }
}

/// Draws the accounting table and returns the number of rows drawn.
fn accounting_entries(flow: &mut Flow, entries: &[AccountingEntry]) -> usize {
    let mut rows: Vec<AccountRow> = entries.iter().map(AccountRow::from_entry).collect();
    while rows.len() < ACCOUNTING_MIN_ROWS {
        rows.push(AccountRow::blank());
    }

    let height = ACCOUNTING_MIN_HEIGHT
        .max(ACCOUNTING_BASE + rows.iter().map(AccountRow::height).sum::<f32>());
    if flow.remaining() < height {
        flow.new_page();
    }

    let block_top = flow.y;
    let mut segment_top = block_top;
    let mut continued = false;
    accounting_header(flow, segment_top, continued);
    let mut y = segment_top + ACCOUNTING_BASE;

    for row in &rows {
        let row_height = row.height();
        if y + row_height > CONTENT_BOTTOM && y > segment_top + ACCOUNTING_BASE {
            close_accounting_segment(flow, segment_top, y);
            flow.new_page();
            continued = true;
            segment_top = flow.y;
            accounting_header(flow, segment_top, continued);
            y = segment_top + ACCOUNTING_BASE;
        }

        for (k, line) in row.account.iter().enumerate() {
            flow.text(
                ACCOUNTING_COLUMNS[0] + PADDING,
                y + 10.0 + ACCOUNT_LINE_HEIGHT * k as f32,
                SMALL_SIZE,
                FontWeight::Regular,
                Align::Left,
                line,
            );
        }
        let code_width = ACCOUNTING_COLUMNS[2] - ACCOUNTING_COLUMNS[1] - 2.0 * PADDING;
        flow.text(
            ACCOUNTING_COLUMNS[1] + PADDING,
            y + 10.0,
            SMALL_SIZE,
            FontWeight::Regular,
            Align::Left,
            &fit_to_width(&row.code, FontWeight::Regular, SMALL_SIZE, code_width),
        );
        flow.text(
            ACCOUNTING_COLUMNS[3] - PADDING,
            y + 10.0,
            SMALL_SIZE,
            FontWeight::Regular,
            Align::Right,
            &row.debit,
        );
        flow.text(
            ACCOUNTING_COLUMNS[4] - PADDING,
            y + 10.0,
            SMALL_SIZE,
            FontWeight::Regular,
            Align::Right,
            &row.credit,
        );

        y += row_height;
        flow.line(CONTENT_LEFT, y, CONTENT_RIGHT, y);
    }

    let bottom = if continued {
        y
    } else {
        y.max(block_top + ACCOUNTING_MIN_HEIGHT)
    };
    close_accounting_segment(flow, segment_top, bottom);
    flow.y = bottom;

    rows.len()
}

fn accounting_header(flow: &mut Flow, top: f32, continued: bool) {
    let title = if continued {
        "ACCOUNTING ENTRIES (continued)"
    } else {
        "ACCOUNTING ENTRIES"
    };
    flow.text(
        CONTENT_LEFT + PADDING,
        top + 13.0,
        BODY_SIZE,
        FontWeight::Bold,
        Align::Left,
        title,
    );
    flow.line(CONTENT_LEFT, top + 18.0, CONTENT_RIGHT, top + 18.0);

    let headings = ["Account", "Account Code", "Debit", "Credit"];
    for (i, heading) in headings.iter().enumerate() {
        flow.text(
            (ACCOUNTING_COLUMNS[i] + ACCOUNTING_COLUMNS[i + 1]) / 2.0,
            top + 29.0,
            SMALL_SIZE,
            FontWeight::Bold,
            Align::Center,
            heading,
        );
    }
    flow.line(
        CONTENT_LEFT,
        top + ACCOUNTING_BASE,
        CONTENT_RIGHT,
        top + ACCOUNTING_BASE,
    );
}

fn close_accounting_segment(flow: &mut Flow, top: f32, bottom: f32) {
    flow.outline(CONTENT_LEFT, top, CONTENT_WIDTH, bottom - top);
    for x in &ACCOUNTING_COLUMNS[1..4] {
        flow.line(*x, top + 18.0, *x, bottom);
    }
}

fn signatures(flow: &mut Flow, voucher: &DisbursementVoucher) {
    let top = flow.y;
    let column_width = CONTENT_WIDTH / 2.0;
    flow.outline(CONTENT_LEFT, top, CONTENT_WIDTH, SIGNATURE_HEIGHT);
    flow.line(
        CONTENT_LEFT + column_width,
        top,
        CONTENT_LEFT + column_width,
        top + SIGNATURE_HEIGHT,
    );

    let blocks = [
        ("Prepared By:", voucher.prepared_by.as_ref()),
        ("Approved By:", voucher.approved_by.as_ref()),
    ];
    for (i, (label, signatory)) in blocks.into_iter().enumerate() {
        let x = CONTENT_LEFT + column_width * i as f32;
        flow.text(
            x + PADDING,
            top + 14.0,
            BODY_SIZE,
            FontWeight::Bold,
            Align::Left,
            label,
        );
        let signatory = signatory.filter(|s| s.has_name());
        signature_line(
            flow,
            x,
            column_width,
            top + 40.0,
            &signatory.map(|s| s.name.to_uppercase()).unwrap_or_default(),
            signatory.map(|s| s.position.as_str()).unwrap_or(""),
        );
        flow.text(
            x + PADDING,
            top + 66.0,
            SMALL_SIZE,
            FontWeight::Regular,
            Align::Left,
            "Date: ____________________",
        );
    }

    flow.y += SIGNATURE_HEIGHT;
}

/// Name above a signature rule, position below, centered in the column.
fn signature_line(
    flow: &mut Flow,
    column_x: f32,
    column_width: f32,
    baseline: f32,
    name: &str,
    position: &str,
) {
    let center = column_x + column_width / 2.0;
    let inner = column_width - 4.0 * PADDING;
    if !name.is_empty() {
        flow.text(
            center,
            baseline,
            BODY_SIZE,
            FontWeight::Bold,
            Align::Center,
            &fit_to_width(name, FontWeight::Bold, BODY_SIZE, inner),
        );
    }
    flow.line(
        column_x + 2.0 * PADDING,
        baseline + 3.0,
        column_x + column_width - 2.0 * PADDING,
        baseline + 3.0,
    );
    if !position.trim().is_empty() {
        flow.text(
            center,
            baseline + 13.0,
            SMALL_SIZE,
            FontWeight::Regular,
            Align::Center,
            &fit_to_width(position, FontWeight::Regular, SMALL_SIZE, inner),
        );
    }
}

fn amount_or_blank(value: Decimal) -> String {
    if value.is_zero() {
        String::new()
    } else {
        format_currency(value)
    }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Vertical cursor over the pages being filled.
struct Flow {
    done: Vec<Page>,
    current: Page,
    y: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: Page::new(1),
            y: CONTENT_TOP,
        }
    }

    fn remaining(&self) -> f32 {
        CONTENT_BOTTOM - self.y
    }

    fn new_page(&mut self) {
        let next = Page::new(self.current.number + 1);
        self.done.push(std::mem::replace(&mut self.current, next));
        self.y = CONTENT_TOP;
    }

    fn finish(mut self) -> Vec<Page> {
        self.done.push(self.current);
        self.done
    }

    fn push(&mut self, op: DrawOp) {
        self.current.ops.push(op);
    }

    fn text(&mut self, x: f32, y: f32, size: f32, weight: FontWeight, align: Align, content: &str) {
        if content.is_empty() {
            return;
        }
        self.push(DrawOp::Text {
            x,
            y,
            size,
            weight,
            align,
            content: content.to_string(),
        });
    }

    /// Bold label followed by a regular value cut to the remaining width.
    fn labeled(&mut self, x: f32, baseline: f32, width: f32, label: &str, value: &str) {
        self.text(x, baseline, BODY_SIZE, FontWeight::Bold, Align::Left, label);
        let offset = text_width(label, FontWeight::Bold, BODY_SIZE) + 3.0;
        let value = fit_to_width(value, FontWeight::Regular, BODY_SIZE, width - offset);
        self.text(
            x + offset,
            baseline,
            BODY_SIZE,
            FontWeight::Regular,
            Align::Left,
            &value,
        );
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width: RULE,
        });
    }

    fn outline(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill_gray: None,
            stroke: true,
        });
    }
}
