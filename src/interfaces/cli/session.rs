use crate::application::engine::BankEngine;
use crate::domain::account::AccountId;
use crate::error::{BankError, Result};
use std::io::{BufRead, Write};

pub const GUEST_MENU: &str = "1. Create an account\n2. Log into account\n0. Exit";
pub const MEMBER_MENU: &str =
    "1. Balance\n2. Add income\n3. Do transfer\n4. Close account\n5. Log out\n0. Exit";

const UNSUPPORTED_OPTION: &str = "Sorry, that option is unsupported!";
const NOT_A_NUMBER: &str = "Please enter a positive whole number.";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
    EndOfInput,
}

/// The interactive menu dialogue of one user.
///
/// Generic over its input and output so it can run against stdin/stdout or
/// in-memory buffers. At most one account is logged in at a time.
pub struct Session<'a, R, W> {
    engine: &'a BankEngine,
    input: R,
    output: W,
    logged_in: Option<AccountId>,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(engine: &'a BankEngine, input: R, output: W) -> Self {
        Self {
            engine,
            input,
            output,
            logged_in: None,
        }
    }

    /// Runs menus until the user exits or the input ends.
    ///
    /// Domain errors are shown to the user and the dialogue goes on; only
    /// operational failures (storage, I/O) end it with an error.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let menu = if self.logged_in.is_some() {
                MEMBER_MENU
            } else {
                GUEST_MENU
            };
            let Some(line) = self.prompt(menu)? else {
                return Ok(());
            };
            let choice = line.parse::<u8>().ok();

            let flow = match self.logged_in {
                None => self.guest(choice).await?,
                Some(id) => self.member(id, choice).await?,
            };
            match flow {
                Flow::Continue => {}
                Flow::Exit => {
                    writeln!(self.output, "\nBye!")?;
                    return Ok(());
                }
                Flow::EndOfInput => return Ok(()),
            }
        }
    }

    async fn guest(&mut self, choice: Option<u8>) -> Result<Flow> {
        match choice {
            Some(1) => match self.engine.open_account().await {
                Ok(account) => writeln!(
                    self.output,
                    "\nYour card has been created\nYour card number:\n{}\nYour card PIN:\n{}\n",
                    account.number, account.pin
                )?,
                Err(e) => self.report(e)?,
            },
            Some(2) => {
                let Some(number) = self.prompt("Enter your card number:")? else {
                    return Ok(Flow::EndOfInput);
                };
                let Some(pin) = self.prompt("Enter your PIN:")? else {
                    return Ok(Flow::EndOfInput);
                };
                match self.engine.log_in(&number, &pin).await {
                    Ok(account) => {
                        self.logged_in = account.id;
                        writeln!(self.output, "\nYou have successfully logged in!\n")?;
                    }
                    Err(e) => self.report(e)?,
                }
            }
            Some(0) => return Ok(Flow::Exit),
            _ => writeln!(self.output, "{UNSUPPORTED_OPTION}")?,
        }
        Ok(Flow::Continue)
    }

    async fn member(&mut self, id: AccountId, choice: Option<u8>) -> Result<Flow> {
        match choice {
            Some(1) => match self.engine.balance(id).await {
                Ok(balance) => writeln!(self.output, "\nBalance: {balance}\n")?,
                Err(e) => self.report(e)?,
            },
            Some(2) => return self.add_income(id).await,
            Some(3) => return self.transfer(id).await,
            Some(4) => match self.engine.close_account(id).await {
                Ok(()) => {
                    self.logged_in = None;
                    writeln!(self.output, "\nThe account has been closed!\n")?;
                }
                Err(e) => self.report(e)?,
            },
            Some(5) => {
                self.logged_in = None;
                writeln!(self.output, "\nYou have successfully logged out!\n")?;
            }
            Some(0) => return Ok(Flow::Exit),
            _ => writeln!(self.output, "{UNSUPPORTED_OPTION}")?,
        }
        Ok(Flow::Continue)
    }

    async fn add_income(&mut self, id: AccountId) -> Result<Flow> {
        let Some(amount) = self.prompt_digits("\nEnter income:")? else {
            return Ok(Flow::EndOfInput);
        };
        match self.engine.add_income(id, &amount).await {
            Ok(_) => writeln!(self.output, "Income was added!\n")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    async fn transfer(&mut self, id: AccountId) -> Result<Flow> {
        let Some(number) = self.prompt("\nTransfer\nEnter card number:")? else {
            return Ok(Flow::EndOfInput);
        };
        let sender = match self.engine.account(id).await {
            Ok(sender) => sender,
            Err(e) => {
                self.report(e)?;
                return Ok(Flow::Continue);
            }
        };
        // Reject a bad card number before asking for the amount.
        if let Err(e) = self.engine.check_receiver(&sender, &number).await {
            self.report(e)?;
            return Ok(Flow::Continue);
        }

        let Some(amount) = self.prompt_digits("Enter how much money you want to transfer:")? else {
            return Ok(Flow::EndOfInput);
        };
        match self.engine.transfer(&sender, &number, &amount).await {
            Ok(_) => writeln!(self.output, "Success!\n")?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    /// Shows a recoverable error to the user, or hands an operational one back.
    fn report(&mut self, error: BankError) -> Result<()> {
        if error.is_operational() {
            return Err(error);
        }
        // The account vanished under the session.
        if matches!(error, BankError::AccountNotFound(_)) {
            self.logged_in = None;
        }
        writeln!(self.output, "{error}\n")?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        writeln!(self.output, "{text}")?;
        self.output.flush()?;

        // Bytes that are not UTF-8 decode lossily and fail later parsing.
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }

    /// Prompts until the answer is made of digits only.
    fn prompt_digits(&mut self, text: &str) -> Result<Option<String>> {
        loop {
            let Some(answer) = self.prompt(text)? else {
                return Ok(None);
            };
            if !answer.is_empty() && answer.bytes().all(|b| b.is_ascii_digit()) {
                return Ok(Some(answer));
            }
            writeln!(self.output, "{NOT_A_NUMBER}")?;
        }
    }
}
